//! Listing extraction from job-board markup.
//!
//! Every listing panel must carry all three labeled sub-elements. A panel
//! missing one fails the whole extraction rather than being skipped, so a
//! markup change on the source site surfaces as an error instead of a
//! silently shorter list.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::types::JobRecord;

/// CSS selectors describing the source page's markup contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    pub panel: String,
    pub company: String,
    pub title: String,
    pub deadline: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            panel: "div.c-content-panel".to_string(),
            company: "h5.job_cname".to_string(),
            title: "h3.job_title".to_string(),
            deadline: "h5.job_deadline".to_string(),
        }
    }
}

/// Parsed selectors, ready to run against a document.
pub struct Extractor {
    panel: Selector,
    company: Selector,
    title: Selector,
    deadline: Selector,
}

impl Extractor {
    pub fn new(selectors: &ListingSelectors) -> ExtractResult<Self> {
        Ok(Self {
            panel: parse_selector(&selectors.panel)?,
            company: parse_selector(&selectors.company)?,
            title: parse_selector(&selectors.title)?,
            deadline: parse_selector(&selectors.deadline)?,
        })
    }

    /// Extract one record per listing panel, in document order.
    pub fn extract(&self, html: &str) -> ExtractResult<Vec<JobRecord>> {
        let document = Html::parse_document(html);

        let records = document
            .select(&self.panel)
            .enumerate()
            .map(|(index, panel)| {
                Ok(JobRecord {
                    company: field_text(panel, &self.company, index, "company")?,
                    title: field_text(panel, &self.title, index, "title")?,
                    deadline: field_text(panel, &self.deadline, index, "deadline")?,
                })
            })
            .collect::<ExtractResult<Vec<_>>>()?;

        debug!(count = records.len(), "Extracted job listings");
        Ok(records)
    }
}

/// Extract listings using the default selectors.
pub fn extract(html: &str) -> ExtractResult<Vec<JobRecord>> {
    Extractor::new(&ListingSelectors::default())?.extract(html)
}

fn parse_selector(selector: &str) -> ExtractResult<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn field_text(
    panel: ElementRef<'_>,
    selector: &Selector,
    index: usize,
    field: &'static str,
) -> ExtractResult<String> {
    panel
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or(ExtractError::MissingField {
            panel: index,
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(company: &str, title: &str, deadline: &str) -> String {
        format!(
            r#"<div class="c-content-panel">
                 <h3 class="job_title">{title}</h3>
                 <h5 class="job_cname">{company}</h5>
                 <h5 class="job_deadline">{deadline}</h5>
               </div>"#
        )
    }

    fn page(panels: &[String]) -> String {
        format!(
            "<html><head><title>Jobs</title></head><body><main>{}</main></body></html>",
            panels.join("\n")
        )
    }

    #[test]
    fn test_extracts_panels_in_document_order() {
        let html = page(&[
            panel("Acme AS", "Backend Engineer", "2024-05-01"),
            panel("Nordlys", "Data Analyst", "2024-06-15"),
        ]);

        let records = extract(&html).unwrap();
        assert_eq!(
            records,
            vec![
                JobRecord::new("Acme AS", "Backend Engineer", "2024-05-01"),
                JobRecord::new("Nordlys", "Data Analyst", "2024-06-15"),
            ]
        );
    }

    #[test]
    fn test_trims_whitespace_and_joins_nested_text() {
        let html = page(&[r#"<div class="c-content-panel">
                 <h5 class="job_cname">
                     Acme <span>AS</span>
                 </h5>
                 <h3 class="job_title">  Engineer  </h3>
                 <h5 class="job_deadline">
                     2024-05-01
                 </h5>
               </div>"#
            .to_string()]);

        let records = extract(&html).unwrap();
        assert_eq!(records, vec![JobRecord::new("Acme AS", "Engineer", "2024-05-01")]);
    }

    #[test]
    fn test_panel_with_extra_classes_matches() {
        let html = page(&[r#"<div class="grid c-content-panel featured">
                 <h5 class="job_cname">Acme</h5>
                 <h3 class="job_title">Engineer</h3>
                 <h5 class="job_deadline">N/A</h5>
               </div>"#
            .to_string()]);

        let records = extract(&html).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].deadline, "N/A");
    }

    #[test]
    fn test_no_panels_yields_empty() {
        let records = extract("<html><body><p>No jobs right now</p></body></html>").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_sub_element_fails_whole_extraction() {
        let html = page(&[
            panel("Acme", "Engineer", "2024-05-01"),
            r#"<div class="c-content-panel">
                 <h5 class="job_cname">Broken</h5>
                 <h3 class="job_title">No deadline here</h3>
               </div>"#
                .to_string(),
        ]);

        let err = extract(&html).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingField {
                panel: 1,
                field: "deadline"
            }
        ));
    }

    #[test]
    fn test_custom_selectors() {
        let selectors = ListingSelectors {
            panel: "li.job".to_string(),
            company: ".company".to_string(),
            title: ".title".to_string(),
            deadline: "time".to_string(),
        };
        let html = r#"<ul>
            <li class="job"><span class="title">Engineer</span><span class="company">Acme</span><time>2024-05-01</time></li>
        </ul>"#;

        let records = Extractor::new(&selectors).unwrap().extract(html).unwrap();
        assert_eq!(records, vec![JobRecord::new("Acme", "Engineer", "2024-05-01")]);
    }

    #[test]
    fn test_invalid_selector() {
        let selectors = ListingSelectors {
            panel: "div[".to_string(),
            ..ListingSelectors::default()
        };
        assert!(matches!(
            Extractor::new(&selectors),
            Err(ExtractError::InvalidSelector { .. })
        ));
    }
}
