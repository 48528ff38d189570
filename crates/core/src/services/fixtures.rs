//! Model builders shared by the service tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sangam_db::entities::{
    chat_message::{self, MessageKind},
    chat_room,
    match_request::{self, MatchStatus},
    profile::{self, Gender},
    subscription_payment::{self, PaymentStatus},
    subscription_plan,
    user::{self, UserRole},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

pub fn empty_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

pub fn user(id: &str, name: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        phone_number: Some("9876543210".to_string()),
        password_hash: String::new(),
        role: UserRole::User,
        name: Some(name.to_string()),
        address: None,
        member_code: format!("USR-{}-12345-001", name.to_uppercase().get(..3).unwrap_or("XXX")),
        token: Some(format!("token_{id}")),
        is_active: true,
        is_email_verified: false,
        is_verified: false,
        profile_image_url: None,
        fcm_token: None,
        is_deleted: false,
        deleted_at: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn profile(id: &str, user_id: &str, gender: Option<Gender>) -> profile::Model {
    profile::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        this_account_for: None,
        mother_tongue: None,
        gender,
        date_of_birth: None,
        height: None,
        physical_status: None,
        marital_status: None,
        children_count: None,
        children_with_me: None,
        religion_id: None,
        caste_id: None,
        sub_caste: None,
        willing_inter_caste: false,
        education: None,
        field_of_study: None,
        occupation: None,
        annual_income: None,
        country: None,
        state: None,
        city: None,
        family_status: None,
        family_worth: None,
        description: None,
        terms_accepted: true,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn plan(id: &str, name: &str, validity_days: i32) -> subscription_plan::Model {
    subscription_plan::Model {
        id: id.to_string(),
        plan_name: name.to_string(),
        price: 99_900,
        validity_days,
        description: None,
        is_active: true,
        created_at: Utc::now().into(),
    }
}

pub fn payment(
    id: &str,
    user_id: &str,
    plan_id: &str,
    status: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
) -> subscription_payment::Model {
    subscription_payment::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        plan_id: plan_id.to_string(),
        amount: 99_900,
        payment_method: Some("upi".to_string()),
        transaction_id: Some(format!("txn_{id}")),
        status,
        paid_at: paid_at.map(Into::into),
        created_at: Utc::now().into(),
    }
}

pub fn request(id: &str, from: &str, to: &str, status: MatchStatus) -> match_request::Model {
    match_request::Model {
        id: id.to_string(),
        from_user_id: from.to_string(),
        to_user_id: to.to_string(),
        status,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn room(id: &str, a: &str, b: &str) -> chat_room::Model {
    let (low, high) = chat_room::canonical_pair(a, b);
    chat_room::Model {
        id: id.to_string(),
        user_low_id: low.to_string(),
        user_high_id: high.to_string(),
        match_request_id: None,
        created_at: Utc::now().into(),
    }
}

pub fn message(id: &str, room_id: &str, sender: &str, receiver: &str) -> chat_message::Model {
    chat_message::Model {
        id: id.to_string(),
        room_id: room_id.to_string(),
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        message_type: MessageKind::Custom,
        message_text: "hello".to_string(),
        question_id: None,
        answer_index: None,
        is_read: false,
        created_at: Utc::now().into(),
    }
}
