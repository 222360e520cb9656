//! User Profiles
//!
//! One profile per authenticated uid, plus the platform-wide signup
//! counters. Signing up writes both documents in a single atomic batch so
//! the counters never drift from the user collection.

use std::sync::Arc;

use shared::models::{
    Actor, Page, PlatformStats, ProfileUpdate, Role, SupplierFilters, UserPreferences,
    UserProfile, UserStats,
};

use crate::error::{MarketError, MarketResult};
use crate::store::{
    BatchOp, Collection, DocumentStore, MAX_CAS_ATTEMPTS, Query, Record, StoreError, collections,
};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_optional_email, validate_optional_gst,
    validate_optional_text, validate_phone, validate_required_text,
};

/// Document id of the single counters document
pub const PLATFORM_STATS_ID: &str = "counters";
pub const DEFAULT_PAGE_LIMIT: usize = 20;
/// Most categories a supplier may list
pub const MAX_CATEGORIES: usize = 20;

impl Record for UserProfile {
    const COLLECTION: &'static str = collections::USERS;

    fn id(&self) -> &str {
        &self.uid
    }
}

impl Record for PlatformStats {
    const COLLECTION: &'static str = collections::PLATFORM_STATS;

    fn id(&self) -> &str {
        PLATFORM_STATS_ID
    }
}

/// Percentage of name, email, location and business name that are filled in
pub fn profile_completeness(profile: &UserProfile) -> u8 {
    let filled = [
        &profile.name,
        &profile.email,
        &profile.location,
        &profile.business_name,
    ]
    .into_iter()
    .filter(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    .count();
    ((filled as f64 / 4.0) * 100.0).round() as u8
}

#[derive(Clone)]
pub struct ProfileManager {
    users: Collection<UserProfile>,
    stats: Collection<PlatformStats>,
}

impl std::fmt::Debug for ProfileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileManager")
            .field("store", &self.users.store().backend())
            .finish()
    }
}

impl ProfileManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Collection::new(store.clone()),
            stats: Collection::new(store),
        }
    }

    /// Create the profile for `user` and count the signup.
    ///
    /// Fails with `AlreadyExists` if the uid already has a profile.
    pub async fn create_profile(
        &self,
        user: &Actor,
        data: ProfileUpdate,
    ) -> MarketResult<UserProfile> {
        validate_phone(&user.phone)?;
        validate_update(&data)?;

        let now = self.users.now();
        let name = data
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(user.name.clone()).filter(|n| !n.trim().is_empty()));
        let mut profile = UserProfile {
            uid: user.id.clone(),
            phone: user.phone.clone(),
            role: user.role,
            name,
            email: data.email,
            location: data.location,
            address: data.address,
            category: data.category,
            business_name: data.business_name,
            gst_number: data.gst_number,
            categories: data.categories.unwrap_or_default(),
            rating: 0.0,
            is_verified: false,
            is_active: true,
            profile_completeness: 0,
            preferences: data.preferences.unwrap_or_default(),
            stats: UserStats::default(),
            created_at: now,
            updated_at: now,
        };
        profile.profile_completeness = profile_completeness(&profile);
        let profile_doc = serde_json::to_value(&profile).map_err(StoreError::from)?;

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = self.stats.get(PLATFORM_STATS_ID).await?;
            let (mut counters, expected) = match current {
                Some(v) => (v.record, Some(v.version)),
                None => (PlatformStats::default(), None),
            };
            counters.record_signup(user.role);
            counters.updated_at = now;
            let counters_doc = serde_json::to_value(&counters).map_err(StoreError::from)?;

            let stats_op = match expected {
                Some(version) => BatchOp::update(
                    collections::PLATFORM_STATS,
                    PLATFORM_STATS_ID,
                    counters_doc,
                    Some(version),
                ),
                None => BatchOp::create(
                    collections::PLATFORM_STATS,
                    PLATFORM_STATS_ID,
                    counters_doc,
                ),
            };
            let ops = vec![
                BatchOp::create(collections::USERS, &profile.uid, profile_doc.clone()),
                stats_op,
            ];

            match self.users.store().atomic_batch(ops).await {
                Ok(()) => {
                    tracing::info!(
                        uid = %profile.uid,
                        role = profile.role.as_str(),
                        completeness = profile.profile_completeness,
                        "User profile created"
                    );
                    return Ok(profile);
                }
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::debug!(uid = %profile.uid, attempt, "Counters changed, retrying signup");
                    tokio::task::yield_now().await;
                }
                Err(StoreError::AlreadyExists { collection, .. })
                    if collection == collections::PLATFORM_STATS =>
                {
                    tracing::debug!(uid = %profile.uid, attempt, "Counters created concurrently, retrying signup");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Contended {
            collection: collections::PLATFORM_STATS.to_string(),
            id: PLATFORM_STATS_ID.to_string(),
            attempts: MAX_CAS_ATTEMPTS,
        }
        .into())
    }

    pub async fn get_profile(&self, uid: &str) -> MarketResult<UserProfile> {
        Ok(self.users.require(uid).await?.record)
    }

    /// Apply the fields present in `data`. Phone, role and uid never change.
    pub async fn update_profile(
        &self,
        uid: &str,
        data: ProfileUpdate,
    ) -> MarketResult<UserProfile> {
        validate_update(&data)?;

        let (profile, ()) = self
            .users
            .modify(uid, |profile, now| {
                let data = data.clone();
                if let Some(name) = data.name {
                    profile.name = Some(name);
                }
                if let Some(email) = data.email {
                    profile.email = Some(email);
                }
                if let Some(location) = data.location {
                    profile.location = Some(location);
                }
                if let Some(address) = data.address {
                    profile.address = Some(address);
                }
                if let Some(category) = data.category {
                    profile.category = Some(category);
                }
                if let Some(business_name) = data.business_name {
                    profile.business_name = Some(business_name);
                }
                if let Some(gst_number) = data.gst_number {
                    profile.gst_number = Some(gst_number);
                }
                if let Some(categories) = data.categories {
                    profile.categories = categories;
                }
                if let Some(preferences) = data.preferences {
                    profile.preferences = preferences;
                }
                profile.profile_completeness = profile_completeness(profile);
                profile.updated_at = now;
                Ok::<_, MarketError>(())
            })
            .await?;

        tracing::info!(
            uid = %uid,
            completeness = profile.profile_completeness,
            "User profile updated"
        );
        Ok(profile)
    }

    /// Active users holding `role`, newest first
    pub async fn list_users_by_role(&self, role: Role) -> MarketResult<Vec<UserProfile>> {
        let query = Query::new()
            .eq("role", role.as_str())
            .eq("is_active", true)
            .order_by("created_at", true);
        Ok(self.users.find(&query).await?.0)
    }

    /// Supplier directory, best rated first
    pub async fn list_suppliers(&self, filters: &SupplierFilters) -> MarketResult<Page<UserProfile>> {
        if let Some(rating) = filters.min_rating
            && !rating.is_finite()
        {
            return Err(MarketError::validation(format!(
                "min_rating must be a finite number, got {rating}"
            )));
        }
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = filters.offset.unwrap_or(0);

        let mut query = Query::new()
            .eq("role", Role::Supplier.as_str())
            .eq("is_active", true)
            .order_by("rating", true)
            .offset(offset)
            .limit(limit);
        if let Some(location) = filters.location.as_deref().filter(|l| !l.trim().is_empty()) {
            query = query.contains_text("location", location.trim());
        }
        if let Some(category) = filters.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.array_contains("categories", category);
        }
        if let Some(rating) = filters.min_rating {
            query = query.gte("rating", rating);
        }
        if let Some(verified) = filters.is_verified {
            query = query.eq("is_verified", verified);
        }

        let (suppliers, total) = self.users.find(&query).await?;
        Ok(Page::new(suppliers, total, offset, limit))
    }

    pub async fn verify_user(&self, uid: &str, admin: &Actor) -> MarketResult<UserProfile> {
        if admin.role != Role::Admin {
            return Err(MarketError::permission_denied("only admins may verify users"));
        }
        let (profile, ()) = self
            .users
            .modify(uid, |profile, now| {
                profile.is_verified = true;
                profile.updated_at = now;
                Ok::<_, MarketError>(())
            })
            .await?;
        tracing::info!(uid = %uid, admin_id = %admin.id, "User verified");
        Ok(profile)
    }

    /// Platform counters; all zero before the first signup
    pub async fn platform_stats(&self) -> MarketResult<PlatformStats> {
        match self.stats.get(PLATFORM_STATS_ID).await {
            Ok(Some(v)) => Ok(v.record),
            Ok(None) => Ok(PlatformStats::default()),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_update(data: &ProfileUpdate) -> MarketResult<()> {
    validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.business_name, "business_name", MAX_NAME_LEN)?;
    validate_optional_text(&data.location, "location", MAX_NAME_LEN)?;
    validate_optional_text(&data.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_email(&data.email)?;
    validate_optional_gst(&data.gst_number)?;
    if let Some(categories) = &data.categories {
        if categories.len() > MAX_CATEGORIES {
            return Err(MarketError::validation(format!(
                "at most {MAX_CATEGORIES} categories, got {}",
                categories.len()
            )));
        }
        for category in categories {
            validate_required_text(category, "categories", MAX_NAME_LEN)?;
        }
    }
    if let Some(UserPreferences { language, .. }) = &data.preferences
        && language.trim().is_empty()
    {
        return Err(MarketError::validation("preferences.language must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
