//! Profile service: own profile, partial updates, lifestyle, images and the
//! summaries shown in candidate lists.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use sangam_common::{AppError, AppResult};
use sangam_db::{
    entities::{
        caste::{self, CasteLevel},
        lifestyle,
        profile::{self, Gender},
        user, user_image,
    },
    repositories::{
        CasteRepository, LifestyleRepository, ProfileRepository, UserImageRepository,
        UserRepository,
    },
};
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Card shown in candidate lists, search results and request inboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub user_id: String,
    pub profile_id: String,
    pub member_code: String,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub age: Option<u32>,
    pub height: Option<String>,
    pub occupation: Option<String>,
    pub location: Option<String>,
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub is_verified: bool,
}

/// Full view of the caller's own account.
#[derive(Debug, Clone, Serialize)]
pub struct OwnProfile {
    pub user: user::Model,
    pub profile: profile::Model,
    pub lifestyle: Option<lifestyle::Model>,
    pub images: Vec<user_image::Model>,
}

/// Profile as another member sees it. Contact and astrology fields are
/// only available through a reveal.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    #[serde(flatten)]
    pub summary: ProfileSummary,
    pub gender: Option<Gender>,
    pub mother_tongue: Option<String>,
    pub marital_status: Option<String>,
    pub physical_status: Option<String>,
    pub sub_caste: Option<String>,
    pub education: Option<String>,
    pub field_of_study: Option<String>,
    pub annual_income: Option<String>,
    pub family_status: Option<String>,
    pub description: Option<String>,
    pub lifestyle: Option<PublicLifestyle>,
}

/// Lifestyle fields visible without a reveal.
#[derive(Debug, Clone, Serialize)]
pub struct PublicLifestyle {
    pub music_genres: serde_json::Value,
    pub reading_preferences: serde_json::Value,
    pub movie_tv_genres: serde_json::Value,
    pub favorite_sports: Option<String>,
    pub spoken_languages: Option<String>,
    pub eating_habits: Option<String>,
    pub smoking: Option<String>,
    pub drinking: Option<String>,
}

impl From<lifestyle::Model> for PublicLifestyle {
    fn from(l: lifestyle::Model) -> Self {
        Self {
            music_genres: l.music_genres,
            reading_preferences: l.reading_preferences,
            movie_tv_genres: l.movie_tv_genres,
            favorite_sports: l.favorite_sports,
            spoken_languages: l.spoken_languages,
            eating_habits: l.eating_habits,
            smoking: l.smoking,
            drinking: l.drinking,
        }
    }
}

/// Partial update of the mutable profile fields. Gender, date of birth and
/// the terms flag are fixed at registration.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[validate(url)]
    pub profile_image_url: Option<String>,

    #[validate(length(max = 64))]
    pub mother_tongue: Option<String>,
    #[validate(length(max = 16))]
    pub height: Option<String>,
    #[validate(length(max = 64))]
    pub physical_status: Option<String>,
    #[validate(length(max = 64))]
    pub marital_status: Option<String>,
    #[validate(range(min = 0, max = 20))]
    pub children_count: Option<i32>,
    pub children_with_me: Option<bool>,
    pub religion_id: Option<String>,
    pub caste_id: Option<String>,
    #[validate(length(max = 128))]
    pub sub_caste: Option<String>,
    pub willing_inter_caste: Option<bool>,
    #[validate(length(max = 128))]
    pub education: Option<String>,
    #[validate(length(max = 128))]
    pub field_of_study: Option<String>,
    #[validate(length(max = 128))]
    pub occupation: Option<String>,
    #[validate(length(max = 64))]
    pub annual_income: Option<String>,
    #[validate(length(max = 64))]
    pub country: Option<String>,
    #[validate(length(max = 64))]
    pub state: Option<String>,
    #[validate(length(max = 64))]
    pub city: Option<String>,
    #[validate(length(max = 64))]
    pub family_status: Option<String>,
    #[validate(length(max = 64))]
    pub family_worth: Option<String>,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
}

/// Lifestyle upsert. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LifestyleInput {
    pub music_genres: Option<Vec<String>>,
    pub music_activities: Option<Vec<String>>,
    pub reading_preferences: Option<Vec<String>>,
    pub movie_tv_genres: Option<Vec<String>>,
    #[validate(length(max = 64))]
    pub reading_language: Option<String>,
    #[validate(length(max = 128))]
    pub favorite_sports: Option<String>,
    #[validate(length(max = 128))]
    pub fitness_activity: Option<String>,
    #[validate(length(max = 128))]
    pub spoken_languages: Option<String>,
    #[validate(length(max = 64))]
    pub cooking: Option<String>,
    #[validate(length(max = 16))]
    pub time_of_birth: Option<String>,
    #[validate(length(max = 128))]
    pub place_of_birth: Option<String>,
    #[validate(length(max = 64))]
    pub nakshatra: Option<String>,
    #[validate(length(max = 64))]
    pub rashi: Option<String>,
    #[validate(length(max = 32))]
    pub eating_habits: Option<String>,
    #[validate(length(max = 32))]
    pub smoking: Option<String>,
    #[validate(length(max = 32))]
    pub drinking: Option<String>,
    #[validate(length(max = 128))]
    pub college: Option<String>,
    #[validate(length(max = 128))]
    pub course_degree: Option<String>,
    #[validate(range(min = 1950, max = 2100))]
    pub passing_year: Option<i32>,
}

/// Input for adding a profile image stored elsewhere.
#[derive(Debug, Deserialize, Validate)]
pub struct AddImageInput {
    #[validate(url, length(max = 512))]
    pub image_url: String,
}

/// Profile service.
#[derive(Clone)]
pub struct ProfileService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    lifestyle_repo: LifestyleRepository,
    image_repo: UserImageRepository,
    caste_repo: CasteRepository,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        profile_repo: ProfileRepository,
        lifestyle_repo: LifestyleRepository,
        image_repo: UserImageRepository,
        caste_repo: CasteRepository,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            lifestyle_repo,
            image_repo,
            caste_repo,
        }
    }

    /// The caller's own profile.
    pub async fn get_own(&self, user_id: &str) -> AppResult<OwnProfile> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let profile = self.profile_repo.get_by_user_id(user_id).await?;
        let lifestyle = self.lifestyle_repo.find_by_profile_id(&profile.id).await?;
        let images = self.image_repo.find_by_user(user_id).await?;

        Ok(OwnProfile {
            user,
            profile,
            lifestyle,
            images,
        })
    }

    /// Apply a partial update to the caller's profile.
    pub async fn update(&self, user_id: &str, input: UpdateProfileInput) -> AppResult<OwnProfile> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let profile = self.profile_repo.get_by_user_id(user_id).await?;

        let religion_id = input.religion_id.clone().or_else(|| profile.religion_id.clone());
        self.check_taxonomy(
            religion_id.as_deref(),
            input.religion_id.as_deref(),
            input.caste_id.as_deref(),
        )
        .await?;

        let now = Utc::now();
        if input.name.is_some() || input.address.is_some() || input.profile_image_url.is_some() {
            let mut active: user::ActiveModel = user.into();
            set_some(&mut active.name, input.name.map(|n| n.trim().to_string()));
            set_some(&mut active.address, input.address);
            set_some(&mut active.profile_image_url, input.profile_image_url);
            active.updated_at = Set(Some(now.into()));
            self.user_repo.update(active).await?;
        }

        let mut active: profile::ActiveModel = profile.into();
        set_some(&mut active.mother_tongue, input.mother_tongue);
        set_some(&mut active.height, input.height);
        set_some(&mut active.physical_status, input.physical_status);
        set_some(&mut active.marital_status, input.marital_status);
        set_some(&mut active.children_count, input.children_count);
        set_some(&mut active.children_with_me, input.children_with_me);
        set_some(&mut active.religion_id, input.religion_id);
        set_some(&mut active.caste_id, input.caste_id);
        set_some(&mut active.sub_caste, input.sub_caste);
        if let Some(open) = input.willing_inter_caste {
            active.willing_inter_caste = Set(open);
        }
        set_some(&mut active.education, input.education);
        set_some(&mut active.field_of_study, input.field_of_study);
        set_some(&mut active.occupation, input.occupation);
        set_some(&mut active.annual_income, input.annual_income);
        set_some(&mut active.country, input.country);
        set_some(&mut active.state, input.state);
        set_some(&mut active.city, input.city);
        set_some(&mut active.family_status, input.family_status);
        set_some(&mut active.family_worth, input.family_worth);
        set_some(&mut active.description, input.description);
        active.updated_at = Set(Some(now.into()));
        self.profile_repo.update(active).await?;

        self.get_own(user_id).await
    }

    /// Create or update the lifestyle row of the caller's profile.
    pub async fn upsert_lifestyle(
        &self,
        user_id: &str,
        input: LifestyleInput,
    ) -> AppResult<lifestyle::Model> {
        input.validate()?;

        let profile = self.profile_repo.get_by_user_id(user_id).await?;
        let now = Utc::now();

        let existing = self.lifestyle_repo.find_by_profile_id(&profile.id).await?;
        let (mut active, exists) = match existing {
            Some(existing) => (existing.into(), true),
            None => (
                lifestyle::ActiveModel {
                    id: Set(crate::generate_id()),
                    profile_id: Set(profile.id.clone()),
                    music_genres: Set(serde_json::json!([])),
                    music_activities: Set(serde_json::json!([])),
                    reading_preferences: Set(serde_json::json!([])),
                    movie_tv_genres: Set(serde_json::json!([])),
                    created_at: Set(now.into()),
                    ..Default::default()
                },
                false,
            ),
        };
        apply_lifestyle(&mut active, input);

        if exists {
            active.updated_at = Set(Some(now.into()));
            self.lifestyle_repo.update(active).await
        } else {
            self.lifestyle_repo.create(active).await
        }
    }

    /// Another member's profile without contact or astrology fields.
    pub async fn public_profile(&self, user_id: &str) -> AppResult<PublicProfile> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if !user.is_active {
            return Err(AppError::NotFound(format!("User {user_id}")));
        }
        let profile = self.profile_repo.get_by_user_id(user_id).await?;
        let lifestyle = self.lifestyle_repo.find_by_profile_id(&profile.id).await?;
        let labels = self
            .caste_labels(profile.religion_id.iter().chain(profile.caste_id.iter()))
            .await?;

        let summary = summarize(&profile, &user, &labels, Utc::now().date_naive());
        Ok(PublicProfile {
            summary,
            gender: profile.gender,
            mother_tongue: profile.mother_tongue,
            marital_status: profile.marital_status,
            physical_status: profile.physical_status,
            sub_caste: profile.sub_caste,
            education: profile.education,
            field_of_study: profile.field_of_study,
            annual_income: profile.annual_income,
            family_status: profile.family_status,
            description: profile.description,
            lifestyle: lifestyle.map(PublicLifestyle::from),
        })
    }

    /// Summaries for a list of profiles, in the given order.
    ///
    /// Profiles whose user is missing or deleted are dropped.
    pub async fn summaries(&self, profiles: &[profile::Model]) -> AppResult<Vec<ProfileSummary>> {
        let user_ids: Vec<String> = profiles.iter().map(|p| p.user_id.clone()).collect();
        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .filter(|u| !u.is_deleted)
            .map(|u| (u.id.clone(), u))
            .collect();

        let labels = self
            .caste_labels(
                profiles
                    .iter()
                    .flat_map(|p| p.religion_id.iter().chain(p.caste_id.iter()))
                    .collect::<Vec<_>>()
                    .into_iter(),
            )
            .await?;

        let today = Utc::now().date_naive();
        Ok(profiles
            .iter()
            .filter_map(|p| users.get(&p.user_id).map(|u| summarize(p, u, &labels, today)))
            .collect())
    }

    /// Summaries keyed by user ID, for the given users.
    pub async fn summaries_for_users(
        &self,
        user_ids: &[String],
    ) -> AppResult<HashMap<String, ProfileSummary>> {
        let profiles = self.profile_repo.find_by_user_ids(user_ids).await?;
        Ok(self
            .summaries(&profiles)
            .await?
            .into_iter()
            .map(|s| (s.user_id.clone(), s))
            .collect())
    }

    /// Images of the caller, oldest first.
    pub async fn list_images(&self, user_id: &str) -> AppResult<Vec<user_image::Model>> {
        self.image_repo.find_by_user(user_id).await
    }

    /// Attach an already uploaded image to the caller.
    pub async fn add_image(
        &self,
        user_id: &str,
        input: AddImageInput,
    ) -> AppResult<user_image::Model> {
        input.validate()?;
        self.image_repo
            .create(user_image::ActiveModel {
                id: Set(crate::generate_id()),
                user_id: Set(user_id.to_string()),
                image_url: Set(input.image_url),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Delete one of the caller's images.
    pub async fn delete_image(&self, user_id: &str, image_id: &str) -> AppResult<()> {
        if self.image_repo.delete_owned(image_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Image not found".to_string()))
        }
    }

    async fn caste_labels<'a>(
        &self,
        ids: impl Iterator<Item = &'a String>,
    ) -> AppResult<HashMap<String, String>> {
        let mut ids: Vec<String> = ids.cloned().collect();
        ids.sort();
        ids.dedup();
        Ok(self
            .caste_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    /// A new religion must be a religion node; a new caste must sit under
    /// the profile's religion.
    async fn check_taxonomy(
        &self,
        religion_id: Option<&str>,
        new_religion: Option<&str>,
        new_caste: Option<&str>,
    ) -> AppResult<()> {
        if let Some(id) = new_religion {
            let node = self.caste_repo.find_by_id(id).await?;
            if !node.is_some_and(|n| n.level == CasteLevel::Religion && n.is_active) {
                return Err(AppError::Validation(format!("Unknown religion {id}")));
            }
        }
        if let Some(id) = new_caste {
            let node = self.caste_repo.find_by_id(id).await?;
            if !node.is_some_and(|n| caste_belongs_to(&n, religion_id)) {
                return Err(AppError::Validation(format!("Unknown caste {id}")));
            }
        }
        Ok(())
    }
}

fn caste_belongs_to(node: &caste::Model, religion_id: Option<&str>) -> bool {
    node.level == CasteLevel::Caste
        && node.is_active
        && religion_id.is_none_or(|r| node.parent_id.as_deref() == Some(r))
}

fn set_some<T>(field: &mut ActiveValue<Option<T>>, value: Option<T>)
where
    Option<T>: Into<sea_orm::Value>,
{
    if let Some(v) = value {
        *field = Set(Some(v));
    }
}

fn set_list(field: &mut ActiveValue<serde_json::Value>, value: Option<Vec<String>>) {
    if let Some(items) = value {
        let items: Vec<String> = items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        *field = Set(serde_json::json!(items));
    }
}

fn apply_lifestyle(active: &mut lifestyle::ActiveModel, input: LifestyleInput) {
    set_list(&mut active.music_genres, input.music_genres);
    set_list(&mut active.music_activities, input.music_activities);
    set_list(&mut active.reading_preferences, input.reading_preferences);
    set_list(&mut active.movie_tv_genres, input.movie_tv_genres);
    set_some(&mut active.reading_language, input.reading_language);
    set_some(&mut active.favorite_sports, input.favorite_sports);
    set_some(&mut active.fitness_activity, input.fitness_activity);
    set_some(&mut active.spoken_languages, input.spoken_languages);
    set_some(&mut active.cooking, input.cooking);
    set_some(&mut active.time_of_birth, input.time_of_birth);
    set_some(&mut active.place_of_birth, input.place_of_birth);
    set_some(&mut active.nakshatra, input.nakshatra);
    set_some(&mut active.rashi, input.rashi);
    set_some(&mut active.eating_habits, input.eating_habits);
    set_some(&mut active.smoking, input.smoking);
    set_some(&mut active.drinking, input.drinking);
    set_some(&mut active.college, input.college);
    set_some(&mut active.course_degree, input.course_degree);
    set_some(&mut active.passing_year, input.passing_year);
}

/// Whole years from `birth` to `today`, one less before this year's birthday.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Build the summary card of one profile.
#[must_use]
pub fn summarize(
    profile: &profile::Model,
    user: &user::Model,
    caste_names: &HashMap<String, String>,
    today: NaiveDate,
) -> ProfileSummary {
    let label = |id: &Option<String>| id.as_ref().and_then(|i| caste_names.get(i)).cloned();
    let location: Vec<&str> = [&profile.city, &profile.state, &profile.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.trim().is_empty())
        .collect();

    ProfileSummary {
        user_id: user.id.clone(),
        profile_id: profile.id.clone(),
        member_code: user.member_code.clone(),
        name: user.name.clone(),
        photo: user.profile_image_url.clone(),
        age: profile.date_of_birth.and_then(|dob| age_on(dob, today)),
        height: profile.height.clone(),
        occupation: profile.occupation.clone(),
        location: (!location.is_empty()).then(|| location.join(", ")),
        religion: label(&profile.religion_id),
        caste: label(&profile.caste_id),
        is_verified: user.is_verified,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_with(
        user_db: MockDatabase,
        profile_db: MockDatabase,
        image_db: MockDatabase,
    ) -> ProfileService {
        ProfileService::new(
            UserRepository::new(Arc::new(user_db.into_connection())),
            ProfileRepository::new(Arc::new(profile_db.into_connection())),
            LifestyleRepository::new(fixtures::empty_db()),
            UserImageRepository::new(Arc::new(image_db.into_connection())),
            CasteRepository::new(fixtures::empty_db()),
        )
    }

    #[test]
    fn test_age_on_birthday_boundaries() {
        let birth = date(1995, 6, 15);
        assert_eq!(age_on(birth, date(2025, 6, 14)), Some(29));
        assert_eq!(age_on(birth, date(2025, 6, 15)), Some(30));
        assert_eq!(age_on(birth, date(2025, 12, 1)), Some(30));
        assert_eq!(age_on(birth, date(1990, 1, 1)), None);
    }

    #[test]
    fn test_age_on_leap_day_birth() {
        let birth = date(2000, 2, 29);
        assert_eq!(age_on(birth, date(2025, 2, 28)), Some(24));
        assert_eq!(age_on(birth, date(2025, 3, 1)), Some(25));
    }

    #[test]
    fn test_summarize_labels_and_location() {
        let user = fixtures::user("u1", "Priya");
        let mut profile = fixtures::profile("p1", "u1", Some(Gender::Female));
        profile.religion_id = Some("r1".to_string());
        profile.caste_id = Some("c9".to_string());
        profile.city = Some("Kochi".to_string());
        profile.country = Some("India".to_string());
        profile.date_of_birth = Some(date(1998, 1, 20));

        let labels = HashMap::from([("r1".to_string(), "Hindu".to_string())]);
        let summary = summarize(&profile, &user, &labels, date(2025, 1, 19));

        assert_eq!(summary.religion.as_deref(), Some("Hindu"));
        assert_eq!(summary.caste, None);
        assert_eq!(summary.location.as_deref(), Some("Kochi, India"));
        assert_eq!(summary.age, Some(26));
        assert_eq!(summary.name.as_deref(), Some("Priya"));
    }

    #[test]
    fn test_caste_belongs_to_religion() {
        let node = caste::Model {
            id: "c1".to_string(),
            name: "Nair".to_string(),
            parent_id: Some("r1".to_string()),
            level: CasteLevel::Caste,
            is_active: true,
            created_at: Utc::now().into(),
        };
        assert!(caste_belongs_to(&node, Some("r1")));
        assert!(caste_belongs_to(&node, None));
        assert!(!caste_belongs_to(&node, Some("r2")));
    }

    #[test]
    fn test_apply_lifestyle_trims_lists_and_keeps_absent_fields() {
        let mut active = lifestyle::ActiveModel {
            smoking: Set(Some("no".to_string())),
            ..Default::default()
        };
        apply_lifestyle(
            &mut active,
            LifestyleInput {
                music_genres: Some(vec![" carnatic ".to_string(), String::new()]),
                drinking: Some("occasionally".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(active.music_genres, Set(serde_json::json!(["carnatic"])));
        assert_eq!(active.smoking, Set(Some("no".to_string())));
        assert_eq!(active.drinking, Set(Some("occasionally".to_string())));
    }

    #[tokio::test]
    async fn test_get_own_without_profile_is_not_found() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::user("u1", "Priya")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(matches!(
            service.get_own("u1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_foreign_image_is_not_found() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
        );

        assert!(matches!(
            service.delete_image("u1", "img_other").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_image_rejects_non_url() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .add_image(
                "u1",
                AddImageInput {
                    image_url: "not a url".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
