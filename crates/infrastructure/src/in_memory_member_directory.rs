use async_trait::async_trait;
use ekklesia_application::{MemberDirectory, MemberOption, MemberPage, MemberPageQuery};
use ekklesia_core::AppResult;
use tokio::sync::RwLock;

/// In-memory member lookup for committee pickers.
#[derive(Debug, Default)]
pub struct InMemoryMemberDirectory {
    members: RwLock<Vec<MemberOption>>,
}

impl InMemoryMemberDirectory {
    /// Creates a directory seeded with members.
    #[must_use]
    pub fn new(members: Vec<MemberOption>) -> Self {
        Self {
            members: RwLock::new(members),
        }
    }

    /// Adds or replaces a member by id.
    pub async fn upsert(&self, member: MemberOption) {
        let mut members = self.members.write().await;
        match members.iter_mut().find(|existing| existing.id == member.id) {
            Some(existing) => *existing = member,
            None => members.push(member),
        }
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn list_members(&self, query: MemberPageQuery) -> AppResult<MemberPage> {
        let members = self.members.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matching: Vec<&MemberOption> = members
            .iter()
            .filter(|member| {
                needle.as_deref().is_none_or(|needle| {
                    member.display_name.to_lowercase().contains(needle)
                })
            })
            .collect();
        matching.sort_by(|left, right| {
            left.display_name
                .cmp(&right.display_name)
                .then_with(|| left.id.cmp(&right.id))
        });

        Ok(MemberPage {
            total: matching.len(),
            items: matching
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .cloned()
                .collect(),
        })
    }
}
