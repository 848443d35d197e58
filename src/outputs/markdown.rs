//! Markdown rendering of edition pages, laid out for mdBook.
//!
//! # Page Structure
//!
//! ```text
//! # Kids News & Activities
//!
//! _Saturday, June 01, 2024_
//!
//! ## In this edition
//! - [Pandas return](#pandas-return)
//!
//! ## Pandas return
//! ...
//!
//! ## Past Editions
//! - [2024-05-31](/2024-05-31/)
//! ```

use super::Renderer;
use super::indexes::summary_md;
use super::site::BuildReport;
use crate::config::SiteConfig;
use crate::models::Story;
use crate::page::{EditionPage, PageRequest};
use crate::utils::{escape_markdown, slugify_title};
use std::fmt::{self, Display};
use std::path::PathBuf;

/// Renders [`EditionPage`]s as Markdown and contributes `SUMMARY.md`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, page: &EditionPage, site: &SiteConfig) -> String {
        MarkdownPage { page, site }.to_string()
    }

    fn index_documents(&self, report: &BuildReport, site: &SiteConfig) -> Vec<(PathBuf, String)> {
        let summary = summary_md(
            report.home_rendered(),
            &report.rendered_editions(),
            site,
            self.extension(),
        );
        vec![(PathBuf::from("SUMMARY.md"), summary)]
    }
}

struct MarkdownPage<'a> {
    page: &'a EditionPage,
    site: &'a SiteConfig,
}

impl Display for MarkdownPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.page;

        if let PageRequest::Archive(_) = page.request {
            writeln!(f, "[← Back to latest]({})\n", self.site.home_href())?;
        }
        writeln!(f, "# {}\n", escape_markdown(&self.site.title))?;
        writeln!(
            f,
            "_{}_\n",
            escape_markdown(&page.edition.display_date_for(&page.current_key))
        )?;

        if page.edition.stories.is_empty() {
            writeln!(f, "No stories in this edition.\n")?;
        } else {
            writeln!(f, "## In this edition\n")?;
            for story in &page.edition.stories {
                writeln!(
                    f,
                    "- [{}](#{})",
                    escape_markdown(&story.title),
                    slugify_title(&story.title)
                )?;
            }
            writeln!(f)?;
        }

        for story in &page.edition.stories {
            StorySection(story).fmt(f)?;
        }

        let heading = match page.request {
            PageRequest::Home => "Past Editions",
            PageRequest::Archive(_) => "Other Editions",
        };
        writeln!(f, "## {heading}\n")?;
        for key in &page.archive {
            writeln!(f, "- [{key}]({})", self.site.edition_href(key))?;
        }
        Ok(())
    }
}

struct StorySection<'a>(&'a Story);

impl Display for StorySection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let story = self.0;
        writeln!(f, "## {}\n", escape_markdown(&story.title))?;
        writeln!(
            f,
            "_{} · {}_\n",
            escape_markdown(&story.date_line),
            escape_markdown(&story.location)
        )?;
        for para in &story.section {
            writeln!(f, "{}\n", escape_markdown(para))?;
        }
        writeln!(
            f,
            "> **Why it matters:** {}\n",
            escape_markdown(&story.why_it_matters)
        )?;
        if let Some(link) = &story.link {
            match story.source_tag() {
                Some(tag) => writeln!(f, "[Read more at {}]({link})\n", escape_markdown(&tag))?,
                None => writeln!(f, "[Read more]({link})\n")?,
            }
        }
        Ok(())
    }
}
