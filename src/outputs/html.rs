//! HTML rendering of edition pages.
//!
//! Produces one self-contained document per page: the edition's stories on
//! the left and the archive navigation in a sidebar. Class names are the
//! hooks a stylesheet would target; no styling is emitted here. All story
//! text is escaped.

use super::Renderer;
use crate::config::SiteConfig;
use crate::models::Story;
use crate::page::{EditionPage, PageRequest};
use crate::utils::{escape_href, escape_html};
use std::fmt::{self, Display};

/// Renders [`EditionPage`]s as HTML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, page: &EditionPage, site: &SiteConfig) -> String {
        HtmlPage { page, site }.to_string()
    }
}

struct HtmlPage<'a> {
    page: &'a EditionPage,
    site: &'a SiteConfig,
}

impl Display for HtmlPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.page;
        let title = escape_html(&self.site.title);
        let display_date = escape_html(&page.edition.display_date_for(&page.current_key));

        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html lang=\"en\">")?;
        writeln!(f, "<head>")?;
        writeln!(f, "<meta charset=\"utf-8\">")?;
        writeln!(
            f,
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
        )?;
        writeln!(f, "<title>{title} · {display_date}</title>")?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f, "<main class=\"layout\">")?;

        writeln!(f, "<section class=\"content\">")?;
        if let PageRequest::Archive(_) = page.request {
            writeln!(
                f,
                "<a class=\"back-link\" href=\"{}\">← Back to latest</a>",
                escape_href(self.site.home_href())
            )?;
        }
        writeln!(f, "<h1>{title}</h1>")?;
        writeln!(
            f,
            "<p class=\"edition-date\"><time datetime=\"{}\">{display_date}</time></p>",
            page.current_key
        )?;
        if page.edition.stories.is_empty() {
            writeln!(f, "<p class=\"empty\">No stories in this edition.</p>")?;
        }
        for story in &page.edition.stories {
            StoryArticle(story).fmt(f)?;
        }
        writeln!(f, "</section>")?;

        let heading = match page.request {
            PageRequest::Home => "Past Editions",
            PageRequest::Archive(_) => "Other Editions",
        };
        writeln!(f, "<aside class=\"sidebar\">")?;
        writeln!(f, "<nav class=\"archive\">")?;
        writeln!(f, "<h3>{heading}</h3>")?;
        writeln!(f, "<ul>")?;
        for key in &page.archive {
            writeln!(
                f,
                "<li><a href=\"{}\">{key}</a></li>",
                escape_href(&self.site.edition_href(key))
            )?;
        }
        writeln!(f, "</ul>")?;
        writeln!(f, "</nav>")?;
        writeln!(f, "</aside>")?;

        writeln!(f, "</main>")?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

struct StoryArticle<'a>(&'a Story);

impl Display for StoryArticle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let story = self.0;
        writeln!(f, "<article class=\"story\" id=\"story-{}\">", story.id)?;
        writeln!(f, "<h2 class=\"story-title\">{}</h2>", escape_html(&story.title))?;
        writeln!(
            f,
            "<div class=\"story-meta\">{} · {}</div>",
            escape_html(&story.date_line),
            escape_html(&story.location)
        )?;
        for para in &story.section {
            writeln!(f, "<p>{}</p>", escape_html(para))?;
        }
        writeln!(f, "<div class=\"story-why\">")?;
        writeln!(f, "<span>Why it matters</span>")?;
        writeln!(f, "{}", escape_html(&story.why_it_matters))?;
        writeln!(f, "</div>")?;
        if let Some(link) = &story.link {
            let label = match story.source_tag() {
                Some(tag) => format!("Read more at {}", escape_html(&tag)),
                None => "Read more".to_string(),
            };
            writeln!(
                f,
                "<p class=\"story-source\"><a href=\"{}\" rel=\"noopener\">{label}</a></p>",
                escape_href(link)
            )?;
        }
        writeln!(f, "</article>")
    }
}
