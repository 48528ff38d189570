//! Match engine: candidate lists, search and the interest request lifecycle.

use chrono::{DateTime, FixedOffset, Utc};
use sangam_common::{AppError, AppResult};
use sangam_db::{
    entities::{
        chat_room,
        match_request::{self, MatchStatus},
        notification::NotificationKind,
        profile,
    },
    repositories::{
        CandidateFilters, CandidateQuery, MatchRequestRepository, ProfileRepository,
        UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::notification::NotificationService;
use crate::services::profile::{ProfileService, ProfileSummary};

/// Maximum number of search results.
const SEARCH_LIMIT: u64 = 50;

/// A request together with the member on the other side.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: String,
    pub status: MatchStatus,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    /// The counterpart: recipient for sent requests, sender for received ones.
    pub user: Option<ProfileSummary>,
}

/// Outcome of accepting a request.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedRequest {
    pub request: match_request::Model,
    pub room: chat_room::Model,
}

/// Match service.
#[derive(Clone)]
pub struct MatchingService {
    profile_repo: ProfileRepository,
    user_repo: UserRepository,
    request_repo: MatchRequestRepository,
    profiles: ProfileService,
    notifications: NotificationService,
}

impl MatchingService {
    /// Create a new match service.
    #[must_use]
    pub const fn new(
        profile_repo: ProfileRepository,
        user_repo: UserRepository,
        request_repo: MatchRequestRepository,
        profiles: ProfileService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            profile_repo,
            user_repo,
            request_repo,
            profiles,
            notifications,
        }
    }

    /// Candidates for `user_id`, newest profiles first.
    ///
    /// Users already linked to the requester by any request never show up.
    pub async fn list_candidates(
        &self,
        user_id: &str,
        filters: &CandidateFilters,
    ) -> AppResult<Vec<ProfileSummary>> {
        let requester = self.profile_repo.find_by_user_id(user_id).await?.ok_or_else(|| {
            AppError::NotFound("Complete your profile to see matches".to_string())
        })?;

        let excluded = self.request_repo.find_linked_user_ids(user_id).await?;
        let query = candidate_query(&requester, &excluded, filters);
        let candidates = self.profile_repo.find_candidates(&query).await?;

        tracing::debug!(user_id = %user_id, count = candidates.len(), "Listed candidates");
        self.profiles.summaries(&candidates).await
    }

    /// Members whose email, phone, name or member code contains `text`.
    pub async fn search(&self, user_id: &str, text: &str) -> AppResult<Vec<ProfileSummary>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![]);
        }

        let users = self.user_repo.search(text, user_id, SEARCH_LIMIT).await?;
        let ids: Vec<String> = users.into_iter().map(|u| u.id).collect();
        let mut summaries = self.profiles.summaries_for_users(&ids).await?;

        Ok(ids.iter().filter_map(|id| summaries.remove(id)).collect())
    }

    /// Send an interest to the owner of `target_profile_id`.
    pub async fn send_interest(
        &self,
        from_user_id: &str,
        target_profile_id: &str,
    ) -> AppResult<match_request::Model> {
        let target = self
            .profile_repo
            .find_by_id(target_profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        if target.user_id == from_user_id {
            return Err(AppError::BadRequest(
                "You cannot send interest to yourself".to_string(),
            ));
        }

        let sender = self.user_repo.get_by_id(from_user_id).await?;
        let recipient = self.user_repo.get_by_id(&target.user_id).await?;

        if self
            .request_repo
            .find_between(from_user_id, &recipient.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Interest already exists between these users".to_string(),
            ));
        }

        let now = Utc::now();
        let request = self
            .request_repo
            .create(match_request::ActiveModel {
                id: Set(crate::generate_id()),
                from_user_id: Set(from_user_id.to_string()),
                to_user_id: Set(recipient.id.clone()),
                status: Set(MatchStatus::Pending),
                created_at: Set(now.into()),
                updated_at: Set(None),
            })
            .await?;

        tracing::info!(request_id = %request.id, from = %from_user_id, to = %recipient.id, "Interest sent");
        self.notifications
            .notify_interest(&recipient, &sender, NotificationKind::InterestReceived, &request.id)
            .await;

        Ok(request)
    }

    /// Accept a pending request addressed to `user_id` and open the pair's chat room.
    pub async fn accept(&self, user_id: &str, request_id: &str) -> AppResult<AcceptedRequest> {
        let request = self.pending_request_for(user_id, request_id).await?;
        let now = Utc::now();

        let room = self
            .request_repo
            .accept_and_open_room(&request, crate::generate_id(), now.into())
            .await?
            .ok_or_else(not_pending)?;

        tracing::info!(request_id = %request.id, room_id = %room.id, "Interest accepted");
        self.notify_sender(&request, NotificationKind::InterestAccepted)
            .await;

        Ok(AcceptedRequest {
            request: match_request::Model {
                status: MatchStatus::Accepted,
                updated_at: Some(now.into()),
                ..request
            },
            room,
        })
    }

    /// Reject a pending request addressed to `user_id`.
    pub async fn reject(&self, user_id: &str, request_id: &str) -> AppResult<match_request::Model> {
        let request = self.pending_request_for(user_id, request_id).await?;
        let now = Utc::now();

        if !self.request_repo.reject(&request.id, now.into()).await? {
            return Err(not_pending());
        }

        tracing::info!(request_id = %request.id, "Interest rejected");
        self.notify_sender(&request, NotificationKind::InterestRejected)
            .await;

        Ok(match_request::Model {
            status: MatchStatus::Rejected,
            updated_at: Some(now.into()),
            ..request
        })
    }

    /// Requests the user has sent, any status.
    pub async fn list_sent(&self, user_id: &str) -> AppResult<Vec<RequestView>> {
        let requests = self.request_repo.find_sent(user_id).await?;
        self.views(requests, |r| r.to_user_id.clone()).await
    }

    /// Pending requests the user has received.
    pub async fn list_received(&self, user_id: &str) -> AppResult<Vec<RequestView>> {
        let requests = self.request_repo.find_received_pending(user_id).await?;
        self.views(requests, |r| r.from_user_id.clone()).await
    }

    async fn pending_request_for(
        &self,
        user_id: &str,
        request_id: &str,
    ) -> AppResult<match_request::Model> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Interest request not found".to_string()))?;

        if request.to_user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the recipient can respond to this request".to_string(),
            ));
        }
        if request.status != MatchStatus::Pending {
            return Err(not_pending());
        }
        Ok(request)
    }

    async fn notify_sender(&self, request: &match_request::Model, kind: NotificationKind) {
        let users = match self
            .user_repo
            .find_by_ids(&[request.from_user_id.clone(), request.to_user_id.clone()])
            .await
        {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(request_id = %request.id, error = %e, "Skipping notification");
                return;
            }
        };

        let sender = users.iter().find(|u| u.id == request.from_user_id);
        let recipient = users.iter().find(|u| u.id == request.to_user_id);
        if let (Some(sender), Some(recipient)) = (sender, recipient) {
            // The original sender is notified about the recipient's answer.
            self.notifications
                .notify_interest(sender, recipient, kind, &request.id)
                .await;
        }
    }

    async fn views(
        &self,
        requests: Vec<match_request::Model>,
        counterpart: impl Fn(&match_request::Model) -> String,
    ) -> AppResult<Vec<RequestView>> {
        let ids: Vec<String> = requests.iter().map(&counterpart).collect();
        let mut summaries = self.profiles.summaries_for_users(&ids).await?;

        Ok(requests
            .into_iter()
            .map(|r| RequestView {
                user: summaries.remove(&counterpart(&r)),
                id: r.id,
                status: r.status,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }
}

fn not_pending() -> AppError {
    AppError::Conflict("Request is no longer pending".to_string())
}

/// Candidate query for a requester.
///
/// Opposite gender when the requester's gender is known. Religion narrows
/// when set; caste narrows too unless the requester is open to inter-caste
/// matches. Without a religion neither applies.
#[must_use]
pub fn candidate_query<'a>(
    requester: &'a profile::Model,
    excluded_user_ids: &'a [String],
    filters: &'a CandidateFilters,
) -> CandidateQuery<'a> {
    CandidateQuery {
        requester_id: &requester.user_id,
        gender: requester.gender.map(profile::Gender::opposite),
        religion_id: requester.religion_id.as_deref(),
        caste_id: match requester.religion_id {
            Some(_) if !requester.willing_inter_caste => requester.caste_id.as_deref(),
            _ => None,
        },
        excluded_user_ids,
        filters,
    }
}
