use std::sync::Arc;

use crate::domain::{Group, GroupDraft, ValidationErrors};
use crate::error::DomainError;
use crate::ports::GroupRepository;

/// Group administration.
#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }

    pub async fn create_group(&self, draft: GroupDraft) -> Result<Group, DomainError> {
        draft.validate()?;
        if self.groups.find_by_slug(&draft.slug).await?.is_some() {
            return Err(ValidationErrors::single("slug", "group with this slug already exists").into());
        }

        let group = self.groups.save(draft.into_group()).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.groups.list().await?)
    }
}
