//! Markup fragments and inline styles built with maud.

use maud::{Markup, html};

/// Inline CSS for the landing page.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#fffaf5;--fg:#1f1a17;--fg2:#5c524b;--fg3:#9a8f86;--accent:#e8663d;--accent-hover:#cc5530;--border:rgba(232,102,61,.2)}
body{font-family:Inter,-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;line-height:1.6;color:var(--fg);background:var(--bg);min-height:100vh;display:flex;flex-direction:column;align-items:center;padding:1.5rem 1rem}
main{max-width:560px;width:100%;flex:1}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline}
.home{display:flex;flex-direction:column;align-items:center;justify-content:center;min-height:60vh;text-align:center;padding:2rem 1rem}
.home-title{font-size:3rem;font-weight:800;letter-spacing:-.03em}
.home-dot{color:var(--accent)}
.home-tagline{font-size:1.15rem;color:var(--fg2);margin-top:.5rem;max-width:420px}
.home-kinds{display:flex;gap:1.5rem;margin-top:2rem;font-size:.95rem;color:var(--fg2)}
.home-kind{display:flex;flex-direction:column;align-items:center;gap:.25rem}
.home-emoji{font-size:2rem}
.btn{display:inline-block;margin-top:2rem;padding:.7rem 1.4rem;background:var(--accent);color:#fff;border-radius:8px;font-weight:600}
.btn:hover{background:var(--accent-hover);text-decoration:none}
.footer{text-align:center;margin-top:1rem;font-size:.8rem;color:var(--fg3)}
@media(prefers-color-scheme:dark){
:root{--bg:#14110f;--fg:#f2ece6;--fg2:#b5aaa1;--fg3:#7a7068;--border:rgba(232,102,61,.3)}
}
"#;

/// Inline CSS for error pages.
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#fffaf5;color:#1f1a17;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5}
.error-page a{color:#e8663d}
@media(prefers-color-scheme:dark){
body{background:#14110f;color:#f2ece6}
.error-page p{color:#aaa}
}
"#;

/// Check if a URL is safe to use in `src` or `href` attributes.
pub fn is_safe_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// The media slot of a share card: the item's own image when it has one,
/// otherwise the kind's emoji on a tile.
pub fn content_media(image_url: Option<&str>, alt: &str, emoji: &str) -> Markup {
    html! {
        @if let Some(url) = image_url.filter(|url| is_safe_url(url)) {
            img src=(url) alt=(alt) class="content-image";
        } @else {
            div class="recipe-emoji" { (emoji) }
        }
    }
}
