//! Internal link rewriting: anchors that point at another page of the same
//! thread are redirected to that page's saved file.

use url::Url;

use crate::profile::SiteProfile;

/// Path of a saved page relative to another saved page.
pub fn local_page_path(page: u32) -> String {
    format!("../html/{}.html", page)
}

/// Page number from the trailing path segment, e.g. `.../hilo-1/7/` → 7.
pub fn page_number(url: &Url) -> Option<u32> {
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())?
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
}

/// What a link is resolved against while one page is being rewritten.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// URL the page was fetched from.
    pub page_url: &'a Url,
    /// Thread root URL (page 1).
    pub thread_url: &'a Url,
    /// Marker a URL must contain to belong to the thread.
    pub slug: &'a str,
    pub profile: &'a SiteProfile,
    /// Map links to the bare thread URL onto page 1.
    pub link_first_page: bool,
}

impl LinkContext<'_> {
    /// Local replacement for `href`, or `None` to leave it untouched.
    ///
    /// Profile and avatar links, external links, links carrying a query and
    /// links to the current page keep their href. A same-thread link whose
    /// last segment is a page number becomes `../html/<n>.html`, keeping its
    /// fragment.
    pub fn local_href(&self, href: &str) -> Option<String> {
        if self.slug.is_empty() || self.profile.is_protected_link(href) {
            return None;
        }

        let resolved = self.page_url.join(href.trim()).ok()?;
        if !resolved.as_str().contains(self.slug) || resolved.query().is_some() {
            return None;
        }
        if without_fragment(&resolved) == without_fragment(self.page_url) {
            return None;
        }

        let page = page_number(&resolved)
            .or_else(|| (self.link_first_page && self.is_thread_root(&resolved)).then_some(1))?;

        let mut local = local_page_path(page);
        if let Some(fragment) = resolved.fragment().filter(|f| !f.is_empty()) {
            local.push('#');
            local.push_str(fragment);
        }
        Some(local)
    }

    fn is_thread_root(&self, url: &Url) -> bool {
        url.host_str() == self.thread_url.host_str()
            && url.path().trim_end_matches('/') == self.thread_url.path().trim_end_matches('/')
    }
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const THREAD: &str = "https://www.example.com/foro/off/hilo-gatos-123";

    fn rewrite(page: u32, href: &str) -> Option<String> {
        let thread_url = Url::parse(THREAD).unwrap();
        let page_url = crate::thread::page_url(&thread_url, page);
        let profile = SiteProfile::default();
        let ctx = LinkContext {
            page_url: &page_url,
            thread_url: &thread_url,
            slug: "hilo-gatos-123",
            profile: &profile,
            link_first_page: true,
        };
        ctx.local_href(href)
    }

    #[test]
    fn test_page_link_rewritten() {
        assert_eq!(rewrite(3, "/foro/off/hilo-gatos-123/7").as_deref(), Some("../html/7.html"));
        assert_eq!(rewrite(3, &format!("{}/7", THREAD)).as_deref(), Some("../html/7.html"));
        assert_eq!(rewrite(3, "4").as_deref(), Some("../html/4.html"));
    }

    #[test]
    fn test_fragment_kept() {
        assert_eq!(
            rewrite(1, "/foro/off/hilo-gatos-123/2#post31").as_deref(),
            Some("../html/2.html#post31")
        );
    }

    #[test]
    fn test_thread_root_maps_to_first_page() {
        assert_eq!(rewrite(4, THREAD).as_deref(), Some("../html/1.html"));
        assert_eq!(rewrite(1, THREAD), None);
    }

    #[rstest]
    #[case::profile("/id/some-user")]
    #[case::avatar("/img/users/avatar/hilo-gatos-123/7")]
    #[case::external("https://other.example.org/7")]
    #[case::current_page("/foro/off/hilo-gatos-123/3")]
    #[case::current_page_anchor("#post5")]
    #[case::not_a_number("/foro/off/hilo-gatos-123/ultima")]
    #[case::zero("/foro/off/hilo-gatos-123/0")]
    #[case::query("/foro/off/hilo-gatos-123/2?u=someone")]
    fn test_left_untouched(#[case] href: &str) {
        assert_eq!(rewrite(3, href), None);
    }

    #[rstest]
    #[case("https://f.example/t/hilo/12", Some(12))]
    #[case("https://f.example/t/hilo/12/", Some(12))]
    #[case("https://f.example/t/hilo", None)]
    #[case("https://f.example/t/hilo/-1", None)]
    fn test_page_number(#[case] url: &str, #[case] expected: Option<u32>) {
        assert_eq!(page_number(&Url::parse(url).unwrap()), expected);
    }
}
