//! Group Manager
//!
//! Buying groups are rosters with a hard member cap. Joining is one
//! compare-and-swap write: the membership check, the capacity check, the
//! append and the `full` recomputation land together or not at all.
//!
//! ```text
//! join_group(id, user)
//!     ├─ read group + version
//!     ├─ reject: inactive/archived, already member, at capacity
//!     ├─ append member, status = full if count == max
//!     └─ write if version unchanged, else re-read and retry
//! ```

use std::sync::Arc;

use shared::models::{
    Actor, BuyingGroup, BuyingGroupCreate, GroupFilters, GroupMember, GroupStats, GroupStatus,
    MemberRole, Page,
};
use shared::util::generate_id;

use crate::error::{MarketError, MarketResult};
use crate::store::{Collection, DocumentStore, Query, Record, collections};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_GROUP_MEMBERS, MAX_GROUP_NAME_LEN, MAX_LOCATION_LEN, MAX_NAME_LEN,
    MAX_NOTE_LEN, MIN_GROUP_MEMBERS, MIN_GROUP_NAME_LEN, MIN_LOCATION_LEN, validate_optional_text,
    validate_required_text, validate_text_length,
};

pub const DEFAULT_MAX_MEMBERS: u32 = 10;
pub const DEFAULT_PAGE_LIMIT: usize = 20;

pub const DEFAULT_RULES: [&str; 4] = [
    "Orders must be placed by 6 PM for next day delivery",
    "Minimum order value ₹500 per member",
    "Payment within 24 hours of delivery",
    "Quality complaints within 2 hours of delivery",
];

impl Record for BuyingGroup {
    const COLLECTION: &'static str = collections::GROUPS;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct GroupManager {
    groups: Collection<BuyingGroup>,
}

impl std::fmt::Debug for GroupManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupManager")
            .field("store", &self.groups.store().backend())
            .finish()
    }
}

impl GroupManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            groups: Collection::new(store),
        }
    }

    /// Create a group owned by `owner`, who becomes its first member
    pub async fn create_group(
        &self,
        data: BuyingGroupCreate,
        owner: &Actor,
    ) -> MarketResult<String> {
        validate_create(&data, owner)?;

        let now = self.groups.now();
        let caller_chose_id = data.id.is_some();
        let id = data.id.unwrap_or_else(generate_id);
        let rules = match data.rules {
            Some(rules) if !rules.is_empty() => rules,
            _ => DEFAULT_RULES.iter().map(|r| r.to_string()).collect(),
        };

        let group = BuyingGroup {
            id: id.clone(),
            name: data.name.trim().to_string(),
            description: data.description,
            location: data.location.trim().to_string(),
            address: data.address,
            category: data.category,
            owner_id: owner.id.clone(),
            owner_name: owner.name.clone(),
            members: vec![owner.id.clone()],
            member_details: [(
                owner.id.clone(),
                GroupMember {
                    name: owner.name.clone(),
                    phone: owner.phone.clone(),
                    joined_at: now,
                    role: MemberRole::Owner,
                },
            )]
            .into(),
            max_members: data.max_members.unwrap_or(DEFAULT_MAX_MEMBERS),
            status: GroupStatus::Active,
            rules,
            settings: data.settings.unwrap_or_default(),
            stats: GroupStats::default(),
            created_at: now,
            updated_at: now,
        };

        self.groups.insert_idempotent(&group, caller_chose_id).await?;
        tracing::info!(
            group_id = %id,
            owner_id = %owner.id,
            max_members = group.max_members,
            "Buying group created"
        );
        Ok(id)
    }

    /// Add `user` as a member; returns the group as written
    pub async fn join_group(&self, group_id: &str, user: &Actor) -> MarketResult<BuyingGroup> {
        let (group, ()) = self
            .groups
            .modify(group_id, |group, now| {
                if matches!(group.status, GroupStatus::Inactive | GroupStatus::Archived) {
                    return Err(MarketError::GroupInactive {
                        group_id: group.id.clone(),
                        status: group.status,
                    });
                }
                if group.is_member(&user.id) {
                    return Err(MarketError::AlreadyMember {
                        group_id: group.id.clone(),
                        user_id: user.id.clone(),
                    });
                }
                if group.status == GroupStatus::Full || !group.has_capacity() {
                    return Err(MarketError::GroupFull {
                        group_id: group.id.clone(),
                        max_members: group.max_members,
                    });
                }

                group.members.push(user.id.clone());
                group.member_details.insert(
                    user.id.clone(),
                    GroupMember {
                        name: user.name.clone(),
                        phone: user.phone.clone(),
                        joined_at: now,
                        role: MemberRole::Member,
                    },
                );
                if !group.has_capacity() {
                    group.status = GroupStatus::Full;
                }
                group.updated_at = now;
                Ok(())
            })
            .await?;

        tracing::info!(
            group_id = %group_id,
            user_id = %user.id,
            members = group.member_count(),
            status = group.status.as_str(),
            "Member joined group"
        );
        Ok(group)
    }

    pub async fn get_group(&self, group_id: &str) -> MarketResult<BuyingGroup> {
        Ok(self.groups.require(group_id).await?.record)
    }

    /// Newest first, offset paged
    pub async fn list_groups(&self, filters: &GroupFilters) -> MarketResult<Page<BuyingGroup>> {
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = filters.offset.unwrap_or(0);

        let mut query = Query::new()
            .order_by("created_at", true)
            .offset(offset)
            .limit(limit);
        if let Some(location) = filters.location.as_deref().filter(|l| !l.is_empty()) {
            query = query.contains_text("location", location);
        }
        if let Some(category) = &filters.category {
            query = query.eq("category", category.as_str());
        }
        if let Some(status) = filters.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(member) = &filters.member_id {
            query = query.array_contains("members", member.as_str());
        }

        let (groups, total) = self.groups.find(&query).await?;
        Ok(Page::new(groups, total, offset, limit))
    }

    /// Administrative status change; the only way a full group reopens
    pub async fn set_status(
        &self,
        group_id: &str,
        status: GroupStatus,
    ) -> MarketResult<BuyingGroup> {
        let (group, previous) = self
            .groups
            .modify(group_id, |group, now| {
                let previous = group.status;
                group.status = status;
                group.updated_at = now;
                Ok::<_, MarketError>(previous)
            })
            .await?;

        tracing::info!(
            group_id = %group_id,
            from = previous.as_str(),
            to = status.as_str(),
            "Group status changed"
        );
        Ok(group)
    }

    /// Bump the order counter after an order is placed in the group
    pub async fn record_order(&self, group_id: &str) -> MarketResult<()> {
        self.groups
            .modify(group_id, |group, now| {
                group.stats.total_orders += 1;
                group.updated_at = now;
                Ok::<_, MarketError>(())
            })
            .await?;
        Ok(())
    }
}

fn validate_create(data: &BuyingGroupCreate, owner: &Actor) -> MarketResult<()> {
    if owner.id.trim().is_empty() {
        return Err(MarketError::validation("group owner must be identified"));
    }
    validate_text_length(&data.name, "name", MIN_GROUP_NAME_LEN, MAX_GROUP_NAME_LEN)?;
    validate_text_length(&data.location, "location", MIN_LOCATION_LEN, MAX_LOCATION_LEN)?;
    validate_required_text(&data.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;

    if let Some(max) = data.max_members
        && !(MIN_GROUP_MEMBERS..=MAX_GROUP_MEMBERS).contains(&max)
    {
        return Err(MarketError::validation(format!(
            "max_members must be between {MIN_GROUP_MEMBERS} and {MAX_GROUP_MEMBERS}, got {max}"
        )));
    }
    if let Some(rules) = &data.rules
        && let Some(rule) = rules.iter().find(|r| r.chars().count() > MAX_NOTE_LEN)
    {
        return Err(MarketError::validation(format!(
            "rule is too long ({} chars, max {MAX_NOTE_LEN})",
            rule.chars().count()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
