//! Quest status derivation.
//!
//! The stored status only knows about claims. Whether an unclaimed quest is
//! ready to claim is derived from the caller's on-chain state.

use std::collections::BTreeMap;

use ethers::types::Address;

use crate::chain::{resolve_card, resolve_socials, CardContract, ChainError, SOCIAL_KEYS};
use crate::models::{ActionType, Quest, QuestStatus};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Alternative words that identify a social key in a quest title.
const SOCIAL_ALIASES: [(&str, &str); 1] = [("twitter", "x")];

/// On-chain and profile facts the predicates look at.
#[derive(Debug, Clone, Default)]
pub struct QuestContext {
    pub has_minted: bool,
    /// Basename from the card record, if any
    pub basename: Option<String>,
    /// Social key to linked value; empty values count as unlinked
    pub socials: BTreeMap<String, String>,
}

impl QuestContext {
    fn has_social(&self, key: &str) -> bool {
        self.socials
            .get(key)
            .is_some_and(|value| !value.trim().is_empty())
    }

    fn has_basename(&self) -> bool {
        self.basename
            .as_deref()
            .is_some_and(|b| !b.trim().is_empty())
            || self.has_social("basename")
    }

    /// Read mint state and socials for `owner`, retrying transient RPC failures.
    pub async fn load(
        contract: &dyn CardContract,
        owner: Address,
        basename: Option<String>,
        policy: &RetryPolicy,
    ) -> Result<Self, ChainError> {
        let card = retry_with_backoff(policy, || resolve_card(contract, owner)).await?;

        let Some(card) = card else {
            return Ok(Self {
                has_minted: false,
                basename,
                socials: BTreeMap::new(),
            });
        };

        let mut socials = resolve_socials(contract, card.token_id).await;

        // Links embedded in the metadata fill keys the per-key reads left empty.
        if let Some(metadata) = card.metadata {
            for link in metadata.socials {
                let entry = socials.entry(link.key.to_lowercase()).or_default();
                if entry.is_empty() {
                    *entry = link.value;
                }
            }
        }

        Ok(Self {
            has_minted: true,
            basename,
            socials,
        })
    }
}

/// First social key named by a whole word of `title`, in [`SOCIAL_KEYS`] order.
pub fn social_key_for_title(title: &str) -> Option<&'static str> {
    let title = title.to_lowercase();
    let words: Vec<&str> = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    SOCIAL_KEYS.iter().copied().find(|key| {
        words.iter().any(|word| {
            *word == *key
                || SOCIAL_ALIASES
                    .iter()
                    .any(|(alias, target)| target == key && word == alias)
        })
    })
}

/// Status of a single quest after applying the claimable predicates.
pub fn derive_status(quest: &Quest, ctx: &QuestContext) -> QuestStatus {
    if quest.status == QuestStatus::Completed {
        return QuestStatus::Completed;
    }

    let claimable = match &quest.action_type {
        ActionType::Mint => ctx.has_minted,
        ActionType::LinkBasename => ctx.has_minted && ctx.has_basename(),
        ActionType::LinkSocial => match social_key_for_title(&quest.title) {
            Some(key) => ctx.has_minted && ctx.has_social(key),
            None => false,
        },
        ActionType::Other(_) => false,
    };

    if claimable {
        QuestStatus::Claimable
    } else {
        quest.status
    }
}

/// Overlay derived statuses onto the server-held list.
pub fn derive_statuses(quests: Vec<Quest>, ctx: &QuestContext) -> Vec<Quest> {
    quests
        .into_iter()
        .map(|quest| {
            let status = derive_status(&quest, ctx);
            Quest { status, ..quest }
        })
        .collect()
}
