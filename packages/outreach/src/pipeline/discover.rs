//! Profile discovery from the filtered company listing.
//!
//! One pass over the listing: the page is nudged down once so lazy entries
//! load, then every profile anchor is read in document order. Each entry is
//! read independently so a bad one never aborts the rest. Results are
//! deduplicated by normalized URL and capped at the run quota.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::error::{DiscoveryError, DriverResult};
use crate::locator::Locators;
use crate::pacing::Pause;
use crate::traits::{
    driver::{ElementHandle, PageDriver},
    pacer::Pacer,
};
use crate::types::candidate::{normalize_profile_url, Candidate};

/// How far the listing is scrolled before profile links are collected.
pub const LISTING_SCROLL_PX: i64 = 500;

/// Company slug as used in listing paths: lowercase, whitespace runs to `-`.
pub fn company_slug(company: &str) -> String {
    company
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// People listing for `company`, narrowed to `affiliation`.
///
/// The affiliation is passed as a keyword filter; a numeric school facet
/// narrows it further when one is known.
pub fn listing_url(
    site_url: &str,
    company: &str,
    affiliation: &str,
    school_facet: Option<&str>,
) -> Result<String, url::ParseError> {
    let base = Url::parse(site_url)?;
    let mut url = base.join(&format!("company/{}/people/", company_slug(company)))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("keywords", affiliation);
        if let Some(facet) = school_facet {
            query.append_pair("facetSchool", facet);
        }
    }
    Ok(url.to_string())
}

pub struct Discoverer {
    site_url: String,
    school_facet: Option<String>,
    locators: Locators,
    pacer: Arc<dyn Pacer>,
}

impl Discoverer {
    pub fn new(site_url: impl Into<String>, locators: Locators, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            site_url: site_url.into(),
            school_facet: None,
            locators,
            pacer,
        }
    }

    pub fn with_school_facet(mut self, facet: Option<String>) -> Self {
        self.school_facet = facet;
        self
    }

    /// Candidates from the listing, at most `max_results`, first-seen order.
    pub async fn discover<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        company: &str,
        affiliation: &str,
        max_results: usize,
    ) -> Result<Vec<Candidate>, DiscoveryError> {
        let site = Url::parse(&self.site_url)?;
        let url = listing_url(
            &self.site_url,
            company,
            affiliation,
            self.school_facet.as_deref(),
        )?;
        info!(company, affiliation, %url, "Opening people listing");

        driver
            .navigate(&url)
            .await
            .map_err(DiscoveryError::Navigation)?;
        self.pacer.pause(Pause::ListingSettle).await;

        // Best effort; whatever already rendered is still worth reading.
        if let Err(e) = driver.scroll_by(LISTING_SCROLL_PX).await {
            debug!(error = %e, "Listing scroll failed");
        }
        self.pacer.pause(Pause::ListingScroll).await;

        let links = self
            .locators
            .profile_link
            .locate_all(driver)
            .await
            .map_err(DiscoveryError::Query)?;
        debug!(count = links.len(), "Found potential profile links");

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for link in &links {
            if candidates.len() >= max_results {
                break;
            }

            match self.read_candidate(driver, &site, link).await {
                Ok(Some(candidate)) => {
                    if seen.insert(candidate.profile_url.clone()) {
                        debug!(name = %candidate.display_name, url = %candidate.profile_url, "Discovered profile");
                        candidates.push(candidate);
                    }
                }
                Ok(None) => debug!("Skipping link without a profile name"),
                Err(e) => debug!(error = %e, "Skipping unreadable listing entry"),
            }
        }

        info!(count = candidates.len(), "Discovery complete");
        Ok(candidates)
    }

    /// `None` for anchors that are not people (no href, no nested name).
    async fn read_candidate<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        site: &Url,
        link: &ElementHandle,
    ) -> DriverResult<Option<Candidate>> {
        let Some(href) = driver.attribute(link, "href").await? else {
            return Ok(None);
        };
        let Some(profile_url) = normalize_profile_url(site, &href) else {
            return Ok(None);
        };
        let Some(name_node) = self.locators.profile_name.locate_within(driver, link).await? else {
            return Ok(None);
        };

        let name = driver.text(&name_node).await?;
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        Ok(Some(Candidate::new(profile_url, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use crate::testing::{MockDriverCall, MockElement, MockPage, MockPageDriver, RecordingPacer};

    const SITE: &str = "https://www.linkedin.com";

    fn listing() -> String {
        listing_url(SITE, "Google", "Vanderbilt University", None).unwrap()
    }

    fn discoverer(pacer: &RecordingPacer) -> Discoverer {
        Discoverer::new(SITE, Locators::default(), Arc::new(pacer.clone()))
    }

    #[test]
    fn test_company_slug() {
        assert_eq!(company_slug("Google"), "google");
        assert_eq!(company_slug("  Goldman   Sachs "), "goldman-sachs");
    }

    #[test]
    fn test_listing_url_encodes_filters() {
        let url = listing_url(SITE, "Jane Street", "Vanderbilt University", Some("4565")).unwrap();
        assert_eq!(
            url,
            "https://www.linkedin.com/company/jane-street/people/?keywords=Vanderbilt+University&facetSchool=4565"
        );
    }

    #[tokio::test]
    async fn test_duplicates_keep_first_seen_order() {
        let locators = Locators::default();
        let page = MockPage::listing(
            &locators,
            &[
                ("https://www.linkedin.com/in/ada?trk=a", Some("Ada Lovelace")),
                ("https://www.linkedin.com/in/grace", Some("Grace Hopper")),
                ("https://www.linkedin.com/in/ada?trk=b", Some("Ada L.")),
                ("https://www.linkedin.com/in/alan", Some("Alan Turing")),
            ],
        );
        let driver = MockPageDriver::new().with_page(listing(), page);
        let pacer = RecordingPacer::new();

        let candidates = discoverer(&pacer)
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap();

        let urls: Vec<_> = candidates.iter().map(|c| c.profile_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.linkedin.com/in/ada",
                "https://www.linkedin.com/in/grace",
                "https://www.linkedin.com/in/alan",
            ]
        );
        assert_eq!(candidates[0].display_name, "Ada Lovelace");
        assert_eq!(pacer.count(Pause::ListingSettle), 1);
    }

    #[tokio::test]
    async fn test_relative_hrefs_resolve_against_site() {
        let locators = Locators::default();
        let page = MockPage::listing(
            &locators,
            &[
                ("/in/ada-lovelace/?miniProfileUrn=x", Some("Ada Lovelace")),
                ("https://www.linkedin.com/in/ada-lovelace/", Some("Ada Lovelace")),
            ],
        );
        let driver = MockPageDriver::new().with_page(listing(), page);

        let candidates = discoverer(&RecordingPacer::new())
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap();

        assert_eq!(
            candidates,
            vec![Candidate::new("https://www.linkedin.com/in/ada-lovelace/", "Ada Lovelace")]
        );
    }

    #[tokio::test]
    async fn test_listing_is_scrolled_after_it_settles() {
        let locators = Locators::default();
        let page = MockPage::listing(
            &locators,
            &[("https://www.linkedin.com/in/ada", Some("Ada Lovelace"))],
        )
        .with_links_below_fold(
            &locators,
            &[("https://www.linkedin.com/in/grace", Some("Grace Hopper"))],
        );
        let driver = MockPageDriver::new().with_page(listing(), page);
        let pacer = CallSnapshotPacer {
            driver: driver.clone(),
            seen: Default::default(),
        };

        let candidates = Discoverer::new(SITE, Locators::default(), Arc::new(pacer.clone()))
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap();

        // Entries that load on scroll are collected too
        let names: Vec<_> = candidates.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);

        assert_eq!(
            driver.calls(),
            vec![
                MockDriverCall::Navigate { url: listing() },
                MockDriverCall::ScrollPage { pixels: LISTING_SCROLL_PX },
            ]
        );
        // Settle sees only the navigation; the scroll pause follows the scroll
        assert_eq!(
            *pacer.seen.lock().unwrap(),
            vec![(Pause::ListingSettle, 1), (Pause::ListingScroll, 2)]
        );
    }

    /// Notes how many driver calls had happened when each pause began.
    #[derive(Clone)]
    struct CallSnapshotPacer {
        driver: MockPageDriver,
        seen: Arc<std::sync::Mutex<Vec<(Pause, usize)>>>,
    }

    #[async_trait::async_trait]
    impl Pacer for CallSnapshotPacer {
        async fn pause(&self, pause: Pause) {
            let calls = self.driver.calls().len();
            self.seen.lock().unwrap().push((pause, calls));
        }
    }

    #[tokio::test]
    async fn test_truncates_to_max_results() {
        let locators = Locators::default();
        let page = MockPage::listing(
            &locators,
            &[
                ("https://www.linkedin.com/in/a", Some("A One")),
                ("https://www.linkedin.com/in/b", Some("B Two")),
                ("https://www.linkedin.com/in/c", Some("C Three")),
                ("https://www.linkedin.com/in/d", Some("D Four")),
            ],
        );
        let driver = MockPageDriver::new().with_page(listing(), page);

        let candidates = discoverer(&RecordingPacer::new())
            .discover(&driver, "Google", "Vanderbilt University", 2)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].display_name, "B Two");
    }

    #[tokio::test]
    async fn test_entries_without_names_are_skipped() {
        let locators = Locators::default();
        let page = MockPage::listing(
            &locators,
            &[
                ("https://www.linkedin.com/in/a", Some("A One")),
                ("https://www.linkedin.com/search/more", None),
                ("https://www.linkedin.com/in/b", Some("B Two")),
            ],
        );
        let driver = MockPageDriver::new().with_page(listing(), page);

        let candidates = discoverer(&RecordingPacer::new())
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap();

        let names: Vec<_> = candidates.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["A One", "B Two"]);
    }

    #[tokio::test]
    async fn test_unreadable_entry_does_not_abort_discovery() {
        let locators = Locators::default();
        let link_selector = &locators.profile_link.strategies[0];
        let name_selector = &locators.profile_name.strategies[0];

        let page = MockPage::new()
            .with_element(
                link_selector,
                MockElement::new("")
                    .failing_reads(DriverError::Stale("detached".into())),
            )
            .with_element(
                link_selector,
                MockElement::new("")
                    .with_attribute("href", "https://www.linkedin.com/in/b")
                    .with_child(name_selector, MockElement::new("  B Two \n")),
            );
        let driver = MockPageDriver::new().with_page(listing(), page);

        let candidates = discoverer(&RecordingPacer::new())
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap();

        assert_eq!(candidates, vec![Candidate::new("https://www.linkedin.com/in/b", "B Two")]);
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let driver = MockPageDriver::new().with_page(listing(), MockPage::new());

        let candidates = discoverer(&RecordingPacer::new())
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap();

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_listing_query_failure_propagates() {
        let locators = Locators::default();
        let mut page = MockPage::new();
        for selector in &locators.profile_link.strategies {
            page = page.with_lookup_error(selector, DriverError::Protocol("session lost".into()));
        }
        let driver = MockPageDriver::new().with_page(listing(), page);

        let err = discoverer(&RecordingPacer::new())
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::Query(_)));
    }

    #[tokio::test]
    async fn test_navigation_failure_propagates() {
        let driver = MockPageDriver::new()
            .with_navigate_error(listing(), DriverError::Session("browser closed".into()));

        let err = discoverer(&RecordingPacer::new())
            .discover(&driver, "Google", "Vanderbilt University", 10)
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::Navigation(_)));
    }
}
