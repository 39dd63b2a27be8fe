//! Fallback policy: every request ends with a presentable card.
//!
//! A missing record becomes a generic card for its kind. A partial record
//! keeps what it has and gets generic values for required display fields.
//! Optional fields stay optional; the composer picks copy that does not
//! mention them.

use crate::card::{Card, CardBody, ContentKind, CookbookCard, InviteCard, Origin, RecipeCard};
use crate::config::Config;

/// Inviter shown when the record does not name one.
pub const UNKNOWN_INVITER: &str = "Someone";

/// Household shown when the record does not name one.
pub const UNKNOWN_HOUSEHOLD: &str = "a household";

/// Turn a resolver result into a fully populated card.
pub fn apply(config: &Config, kind: ContentKind, id: &str, resolved: Option<CardBody>) -> Card {
    let generic = generic_title(kind, &config.site_name);

    let (origin, body) = match resolved.filter(|body| body.kind() == kind) {
        Some(body) => (Origin::Stored, fill_required(body, &generic)),
        None => {
            tracing::debug!(kind = %kind, id = %id, "using fallback card");
            (Origin::Fallback, generic_body(kind, &generic))
        }
    };

    let title = match (&origin, &body) {
        (Origin::Fallback, _) => generic,
        (Origin::Stored, CardBody::Recipe(recipe)) => recipe.name.clone(),
        (Origin::Stored, CardBody::Invite(invite)) => invite.household_name.clone(),
        (Origin::Stored, CardBody::Cookbook(cookbook)) => cookbook.name.clone(),
    };

    let image_url = body
        .own_image_url()
        .map(str::to_string)
        .unwrap_or_else(|| kind.default_image_url(&config.base_url));

    Card {
        id: id.to_string(),
        origin,
        title,
        image_url,
        body,
    }
}

/// Generic title for a kind, e.g. "Recipe on Meal Mingle".
pub fn generic_title(kind: ContentKind, site_name: &str) -> String {
    format!("{} on {site_name}", kind.noun())
}

fn generic_body(kind: ContentKind, generic_title: &str) -> CardBody {
    match kind {
        ContentKind::Recipe => CardBody::Recipe(RecipeCard {
            name: generic_title.to_string(),
            ..Default::default()
        }),
        ContentKind::Invite => CardBody::Invite(InviteCard {
            inviter_name: UNKNOWN_INVITER.to_string(),
            household_name: UNKNOWN_HOUSEHOLD.to_string(),
            member_count: 1,
        }),
        ContentKind::Cookbook => CardBody::Cookbook(CookbookCard {
            name: generic_title.to_string(),
            ..Default::default()
        }),
    }
}

fn fill_required(body: CardBody, generic_title: &str) -> CardBody {
    match body {
        CardBody::Recipe(mut recipe) => {
            or_default(&mut recipe.name, generic_title);
            CardBody::Recipe(recipe)
        }
        CardBody::Invite(mut invite) => {
            or_default(&mut invite.inviter_name, UNKNOWN_INVITER);
            or_default(&mut invite.household_name, UNKNOWN_HOUSEHOLD);
            invite.member_count = invite.member_count.max(1);
            CardBody::Invite(invite)
        }
        CardBody::Cookbook(mut cookbook) => {
            or_default(&mut cookbook.name, generic_title);
            CardBody::Cookbook(cookbook)
        }
    }
}

fn or_default(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

/// Which description a recipe gets, chosen from the fields it actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeBlurb<'a> {
    /// The recipe belongs to a cookbook whose name is known.
    Cookbook(&'a str),
    /// Both cook time and difficulty are known.
    TimeAndDifficulty { time: &'a str, difficulty: &'a str },
    Generic,
}

impl<'a> RecipeBlurb<'a> {
    pub fn select(recipe: &'a RecipeCard) -> Self {
        if let Some(cookbook) = recipe.cookbook_name.as_deref() {
            return Self::Cookbook(cookbook);
        }
        match (recipe.cook_time.as_deref(), recipe.difficulty.as_deref()) {
            (Some(time), Some(difficulty)) => Self::TimeAndDifficulty { time, difficulty },
            _ => Self::Generic,
        }
    }
}
