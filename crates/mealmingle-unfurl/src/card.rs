//! Card model: the normalized metadata for one shared item.
//!
//! Resolvers produce a [`CardBody`] with whatever the backing store had.
//! The fallback policy turns that (or its absence) into a [`Card`] whose
//! required fields are all populated.

/// The three kinds of shareable content, one per route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Recipe,
    Invite,
    Cookbook,
}

impl ContentKind {
    /// Every kind, in route order.
    pub const ALL: [Self; 3] = [Self::Recipe, Self::Invite, Self::Cookbook];

    /// Route segment used in canonical URLs and deep links.
    pub fn route(self) -> &'static str {
        match self {
            Self::Recipe => "recipe",
            Self::Invite => "invite",
            Self::Cookbook => "cookbook",
        }
    }

    /// Icon shown next to the action tag and used as the media fallback.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Recipe => "👨\u{200d}🍳",
            Self::Invite => "🏠",
            Self::Cookbook => "📚",
        }
    }

    /// Short label above the card title.
    pub fn action_tag(self) -> &'static str {
        match self {
            Self::Recipe => "Recipe Shared",
            Self::Invite => "Household Invite",
            Self::Cookbook => "Cookbook Shared",
        }
    }

    /// Label of the "open in app" button.
    pub fn button_text(self) -> &'static str {
        match self {
            Self::Recipe => "Open Recipe",
            Self::Invite => "Join Household",
            Self::Cookbook => "Open Cookbook",
        }
    }

    /// Noun used in generic fallback titles ("Recipe on Meal Mingle").
    pub fn noun(self) -> &'static str {
        match self {
            Self::Recipe => "Recipe",
            Self::Invite => "Household",
            Self::Cookbook => "Cookbook",
        }
    }

    /// Path of the fixed preview image for this kind, relative to the site origin.
    pub fn default_image_path(self) -> &'static str {
        match self {
            Self::Recipe => "/assets/images/recipe-preview.svg?v=6",
            Self::Invite => "/assets/images/invite-preview.svg?v=5",
            Self::Cookbook => "/assets/images/cookbook-preview.svg?v=5",
        }
    }

    /// Absolute URL of the fixed preview image on `base_url`.
    pub fn default_image_url(self, base_url: &str) -> String {
        format!("{base_url}{}", self.default_image_path())
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.route())
    }
}

/// Where a card's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Built from a record in the backing store.
    Stored,
    /// Synthesized because no usable record was found.
    Fallback,
}

/// A shared recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeCard {
    pub name: String,
    pub cook_time: Option<String>,
    pub difficulty: Option<String>,
    pub image_url: Option<String>,
    /// Display name of the cookbook the recipe belongs to, if it could be looked up.
    pub cookbook_name: Option<String>,
}

/// A household invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCard {
    pub inviter_name: String,
    pub household_name: String,
    /// Always at least 1.
    pub member_count: u64,
}

impl Default for InviteCard {
    fn default() -> Self {
        Self {
            inviter_name: String::new(),
            household_name: String::new(),
            member_count: 1,
        }
    }
}

/// A shared cookbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookbookCard {
    pub name: String,
    pub recipe_count: Option<u64>,
    pub image_url: Option<String>,
}

/// Kind-specific card data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Recipe(RecipeCard),
    Invite(InviteCard),
    Cookbook(CookbookCard),
}

impl CardBody {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Recipe(_) => ContentKind::Recipe,
            Self::Invite(_) => ContentKind::Invite,
            Self::Cookbook(_) => ContentKind::Cookbook,
        }
    }

    /// The item's own image, if the stored record carried one.
    ///
    /// Invites never have one: their preview always uses the fixed asset.
    pub fn own_image_url(&self) -> Option<&str> {
        match self {
            Self::Recipe(recipe) => recipe.image_url.as_deref(),
            Self::Invite(_) => None,
            Self::Cookbook(cookbook) => cookbook.image_url.as_deref(),
        }
    }
}

/// A fully populated card, ready for placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub origin: Origin,
    /// Display title, never empty.
    pub title: String,
    /// Preview image, either the item's own or the fixed asset for its kind.
    pub image_url: String,
    pub body: CardBody,
}

impl Card {
    /// Whether the preview image is the item's own rather than the fixed asset.
    pub fn has_own_image(&self) -> bool {
        self.body.own_image_url().is_some()
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }
}

/// Capability shared by everything that can be unfurled.
pub trait Shareable {
    fn id(&self) -> &str;
    fn kind(&self) -> ContentKind;
    fn display_title(&self) -> &str;
    fn display_image_url(&self) -> &str;

    /// Path of the share page, e.g. `/recipe/abc123`. The id is percent-encoded.
    fn canonical_path(&self) -> String {
        format!("/{}/{}", self.kind().route(), urlencoding::encode(self.id()))
    }
}

impl Shareable for Card {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ContentKind {
        self.body.kind()
    }

    fn display_title(&self) -> &str {
        &self.title
    }

    fn display_image_url(&self) -> &str {
        &self.image_url
    }
}
