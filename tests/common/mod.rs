//! Test utilities shared by the crawl engine integration tests
//!
//! `ScriptedSite` stands in for the browser: every URL is answered from a
//! script of replies, and every page and context lifecycle event is counted
//! so tests can assert on recycling and teardown.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use fitmap_crawler::config::{CrawlConfigBuilder, WithBaseUrl};
use fitmap_crawler::crawl_engine::RawContent;
use fitmap_crawler::session_pool::{PageHandle, SessionProvider, SessionStats};
use fitmap_crawler::{CrawlConfig, Region};

pub const BASE_URL: &str = "https://fitmap.jp";

/// One scripted answer to a navigation
#[derive(Debug, Clone)]
pub enum Reply {
    Html(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct SiteState {
    /// One-shot replies, consumed front to back
    scripts: HashMap<String, VecDeque<Reply>>,
    /// Served whenever a URL has no one-shot reply left
    pages: HashMap<String, String>,
    visits: Vec<String>,
    pages_opened: usize,
    pages_closed: usize,
    live_pages: usize,
    contexts_launched: u64,
    contexts_closed: usize,
    context_open: bool,
    generation: u64,
    new_page_failures: usize,
}

/// In-memory site implementing `SessionProvider`
#[derive(Debug, Clone, Default)]
pub struct ScriptedSite {
    state: Arc<Mutex<SiteState>>,
}

impl ScriptedSite {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().expect("site state poisoned")
    }

    /// Serve `html` for `url` on every visit
    pub fn page(&self, url: impl Into<String>, html: impl Into<String>) -> &Self {
        self.lock().pages.insert(url.into(), html.into());
        self
    }

    /// Queue one-shot replies for `url`, served before any persistent page
    pub fn script(&self, url: impl Into<String>, replies: impl IntoIterator<Item = Reply>) -> &Self {
        self.lock()
            .scripts
            .entry(url.into())
            .or_default()
            .extend(replies);
        self
    }

    /// The next `count` calls to `new_page` fail
    pub fn fail_new_page(&self, count: usize) {
        self.lock().new_page_failures = count;
    }

    pub fn visits(&self) -> Vec<String> {
        self.lock().visits.clone()
    }

    pub fn visit_count(&self, url: &str) -> usize {
        self.lock().visits.iter().filter(|v| v.as_str() == url).count()
    }

    pub fn pages_opened(&self) -> usize {
        self.lock().pages_opened
    }

    pub fn pages_closed(&self) -> usize {
        self.lock().pages_closed
    }

    pub fn contexts_launched(&self) -> u64 {
        self.lock().contexts_launched
    }

    pub fn contexts_closed(&self) -> usize {
        self.lock().contexts_closed
    }

    pub fn context_open(&self) -> bool {
        self.lock().context_open
    }
}

/// Page handle bound to the context generation it was opened on
#[derive(Debug)]
pub struct ScriptedPage {
    state: Arc<Mutex<SiteState>>,
    generation: u64,
    current: Option<String>,
}

impl PageHandle for ScriptedPage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let reply = {
            let mut state = self.state.lock().expect("site state poisoned");
            if !state.context_open || state.generation != self.generation {
                return Err(anyhow!("Target closed: context was torn down"));
            }
            state.visits.push(url.to_string());
            let queued = state.scripts.get_mut(url).and_then(VecDeque::pop_front);
            queued
                .or_else(|| state.pages.get(url).cloned().map(Reply::Html))
                .unwrap_or_else(|| Reply::Fail(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))
        };

        match reply {
            Reply::Html(html) => {
                self.current = Some(html);
                Ok(())
            }
            Reply::Fail(reason) => {
                self.current = None;
                Err(anyhow!(reason))
            }
        }
    }

    async fn content(&mut self) -> Result<RawContent> {
        self.current
            .clone()
            .ok_or_else(|| anyhow!("No document loaded"))
    }

    async fn close(self) {
        let mut state = self.state.lock().expect("site state poisoned");
        state.pages_closed += 1;
        if state.context_open && state.generation == self.generation {
            state.live_pages = state.live_pages.saturating_sub(1);
        }
    }
}

impl SessionProvider for ScriptedSite {
    type Page = ScriptedPage;

    async fn new_page(&self) -> Result<ScriptedPage> {
        let mut state = self.lock();
        if state.new_page_failures > 0 {
            state.new_page_failures -= 1;
            return Err(anyhow!("Failed to open page on automation context"));
        }
        if !state.context_open {
            state.context_open = true;
            state.generation += 1;
            state.contexts_launched += 1;
        }
        state.pages_opened += 1;
        state.live_pages += 1;
        Ok(ScriptedPage {
            state: Arc::clone(&self.state),
            generation: state.generation,
            current: None,
        })
    }

    async fn close_context(&self) {
        let mut state = self.lock();
        if state.context_open {
            state.context_open = false;
            state.contexts_closed += 1;
            state.live_pages = 0;
        }
    }

    async fn stats(&self) -> SessionStats {
        let state = self.lock();
        SessionStats {
            pages: state.live_pages,
            contexts: usize::from(state.context_open),
            launches: state.contexts_launched,
        }
    }
}

/// Listing URL of page `page` of region `id` on the scripted site
pub fn region_url(id: u8, page: u32) -> String {
    Region::new(id).expect("valid region").page_url(BASE_URL, page)
}

/// Absolute URL of a listing path such as `/gym/12/`
pub fn listing_url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

/// Builder with every delay zeroed, pointed at the scripted site
pub fn fast_config() -> CrawlConfigBuilder<WithBaseUrl> {
    CrawlConfig::builder().base_url(BASE_URL).without_delays()
}

fn filler(sentence: &str, times: usize) -> String {
    sentence.repeat(times)
}

/// A healthy index page linking to `paths`
pub fn listing_page(paths: &[&str]) -> String {
    let links: String = paths
        .iter()
        .map(|p| format!(r#"<li><a href="{p}">施設 {p}</a></li>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head><title>フィットネスジム一覧 | fitmap</title></head>
<body>
    <ul class="gym-list">{links}</ul>
    <p>{}</p>
    <nav class="pagination"><a class="next" href="?page=99">次へ</a></nav>
</body>
</html>"#,
        filler("フィットネスジムとトレーニング施設の一覧です。", 80)
    )
}

/// An index page carrying the site's error marker and no listings
pub fn error_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head><title>フィットネスジム一覧 | fitmap</title></head>
<body><div class="no-result">該当する施設はありません</div><p>{}</p></body>
</html>"#,
        filler("ジムの検索結果です。", 200)
    )
}

/// Valid title and plenty of text, but no listings and no domain keywords
pub fn hollow_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head><title>一覧 | fitmap</title></head>
<body><p>{}</p></body>
</html>"#,
        filler("このページには表示できる内容がありません。", 120)
    )
}

/// A facility detail page
pub fn detail_page(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head><title>{name} | fitmap</title></head>
<body>
    <h1>{name}</h1>
    <div class="post_adress">東京都渋谷区神南1-2-3 サンプルビル</div>
    <div class="panel_ryokin">月会費 8,800円/月</div>
</body>
</html>"#
    )
}
