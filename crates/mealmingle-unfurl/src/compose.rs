//! Page composer: resolve → fallback → placeholders → rendered HTML.

use crate::card::{Card, CardBody, ContentKind, CookbookCard, InviteCard, RecipeCard, Shareable};
use crate::config::Config;
use crate::fallback::{self, RecipeBlurb};
use crate::render::components::content_media;
use crate::render::{Flags, Placeholder, PlaceholderMap, Template, Value};
use crate::resolve;
use crate::state::AppState;

/// A rendered share page and the card it was built from.
#[derive(Debug, Clone)]
pub struct SharePage {
    pub html: String,
    pub card: Card,
}

/// Build the share page for `kind`/`id`. Always produces a page.
pub async fn compose(state: &AppState, kind: ContentKind, id: &str) -> SharePage {
    let resolved = resolve::resolve(state, kind, id).await;
    let card = fallback::apply(&state.config, kind, id, resolved);
    let html = render_card(&state.config, &state.template, &card);

    tracing::debug!(
        kind = %kind,
        id = %id,
        fallback = card.is_fallback(),
        bytes = html.len(),
        "share page composed"
    );

    SharePage { html, card }
}

/// Render one card against the template.
pub fn render_card(config: &Config, template: &Template, card: &Card) -> String {
    template.render(&placeholders(config, card), &flags(card))
}

/// Conditional block flags for a card.
pub fn flags(card: &Card) -> Flags {
    [
        ("fallback", card.is_fallback()),
        ("hasImage", card.has_own_image()),
    ]
    .into_iter()
    .collect()
}

/// Every placeholder value for a card.
pub fn placeholders(config: &Config, card: &Card) -> PlaceholderMap {
    let copy = PageCopy::for_card(config, card);
    let kind = card.kind();

    Placeholder::ALL
        .into_iter()
        .map(|placeholder| {
            let value = match placeholder {
                Placeholder::PageTitle => Value::Text(copy.page_title.clone()),
                Placeholder::OgTitle => Value::Text(copy.og_title.clone()),
                Placeholder::OgDescription => Value::Text(copy.og_description.clone()),
                Placeholder::OgImageUrl => Value::Text(card.display_image_url().to_string()),
                Placeholder::CanonicalUrl => Value::Text(canonical_url(config, card)),
                Placeholder::DeepLinkUrl => Value::Text(deep_link_url(config, card)),
                Placeholder::AppStoreUrl => Value::Text(config.app_store_url.clone()),
                Placeholder::SiteName => Value::Text(config.site_name.clone()),
                Placeholder::ContentTitle => Value::Text(copy.content_title.clone()),
                Placeholder::ContentDescription => Value::Text(copy.content_description.clone()),
                Placeholder::ContentEmoji => Value::Text(kind.emoji().to_string()),
                Placeholder::ContentMedia => Value::Markup(
                    content_media(card.body.own_image_url(), card.display_title(), kind.emoji())
                        .into_string(),
                ),
                Placeholder::ActionTag => Value::Text(kind.action_tag().to_string()),
                Placeholder::ButtonText => Value::Text(kind.button_text().to_string()),
            };
            (placeholder, value)
        })
        .collect()
}

/// `https://meal-mingle.app/recipe/abc123`
pub fn canonical_url(config: &Config, card: &Card) -> String {
    format!("{}{}", config.base_url, card.canonical_path())
}

/// `mealmingle://recipe/abc123`
pub fn deep_link_url(config: &Config, card: &Card) -> String {
    format!(
        "{}://{}/{}",
        config.app_scheme,
        card.kind().route(),
        urlencoding::encode(card.id())
    )
}

/// The human-readable text of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageCopy {
    page_title: String,
    og_title: String,
    og_description: String,
    content_title: String,
    content_description: String,
}

impl PageCopy {
    fn for_card(config: &Config, card: &Card) -> Self {
        let site = config.site_name.as_str();
        let title = card.display_title();

        let mut copy = match &card.body {
            CardBody::Recipe(recipe) => Self::recipe(site, title, recipe),
            CardBody::Invite(_) if card.is_fallback() => Self::unknown_invite(site, title),
            CardBody::Invite(invite) => Self::invite(site, invite),
            CardBody::Cookbook(cookbook) => Self::cookbook(site, title, cookbook),
        };

        if card.is_fallback() {
            copy.page_title = title.to_string();
        }
        copy
    }

    fn recipe(site: &str, title: &str, recipe: &RecipeCard) -> Self {
        let pitch =
            format!("Open in {site} to save this recipe to your collection and start cooking!");
        let (og_description, content_description) = match RecipeBlurb::select(recipe) {
            RecipeBlurb::Cookbook(cookbook) => (
                format!("From {cookbook} • Shared on {site}"),
                format!("From {cookbook} • {pitch}"),
            ),
            RecipeBlurb::TimeAndDifficulty { time, difficulty } => (
                format!("Ready in {time} • {difficulty} • Shared on {site}"),
                format!("Ready in {time} • {difficulty} difficulty • {pitch}"),
            ),
            RecipeBlurb::Generic => (format!("A delicious recipe shared on {site}"), pitch),
        };

        Self {
            page_title: format!("{title} - {site}"),
            og_title: format!("{title} {}", ContentKind::Recipe.emoji()),
            og_description,
            content_title: title.to_string(),
            content_description,
        }
    }

    fn invite(site: &str, invite: &InviteCard) -> Self {
        let inviter = &invite.inviter_name;
        let household = &invite.household_name;
        let members = counted(invite.member_count, "family member", "family members");

        Self {
            page_title: format!("Join {household} - {site}"),
            og_title: format!(
                "{inviter} invited you to join {household}! {}",
                ContentKind::Invite.emoji()
            ),
            og_description: format!(
                "Join {members} sharing recipes, meal plans, and grocery lists on {site}."
            ),
            content_title: format!("Join {household}"),
            content_description: format!(
                "{inviter} invited you to share recipes, meal plans, \
                 and grocery lists with {members}."
            ),
        }
    }

    fn unknown_invite(site: &str, title: &str) -> Self {
        Self {
            page_title: title.to_string(),
            og_title: format!(
                "You're invited to join a household on {site}! {}",
                ContentKind::Invite.emoji()
            ),
            og_description: format!(
                "Share recipes, meal plans, and grocery lists with your family on {site}."
            ),
            content_title: title.to_string(),
            content_description: format!(
                "You've been invited to share recipes, meal plans, and grocery lists on {site}."
            ),
        }
    }

    fn cookbook(site: &str, title: &str, cookbook: &CookbookCard) -> Self {
        let (og_description, content_description) = match cookbook.recipe_count {
            Some(n) => (
                format!(
                    "{} • Shared on {site}",
                    counted(n, "delicious recipe", "delicious recipes")
                ),
                format!(
                    "Explore {} in this collection!",
                    counted(n, "amazing recipe", "amazing recipes")
                ),
            ),
            None => (
                format!("A collection of recipes shared on {site}"),
                format!("Explore this collection of recipes on {site}!"),
            ),
        };

        Self {
            page_title: format!("{title} - {site}"),
            og_title: format!("{title} {}", ContentKind::Cookbook.emoji()),
            og_description,
            content_title: title.to_string(),
            content_description,
        }
    }
}

/// "1 family member", "4 family members".
fn counted(n: u64, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}
