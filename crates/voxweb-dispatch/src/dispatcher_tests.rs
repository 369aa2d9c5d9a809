use super::*;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use voxweb_protocols::browser::{ScrollAmount, ScrollDirection};
use voxweb_protocols::capture::CaptureHandle;
use voxweb_protocols::error::{BrowserError, VisionError};
use voxweb_protocols::status::NullStatusSink;
use voxweb_protocols::vision::VisionAnalyzer;

#[derive(Default)]
struct MockBrowser {
    location: Mutex<Option<String>>,
    fail_navigate: AtomicBool,
    fail_click: AtomicBool,
    navigations: Mutex<Vec<String>>,
    clicks: Mutex<Vec<String>>,
    scrolls: Mutex<Vec<(ScrollDirection, ScrollAmount)>>,
    back_calls: AtomicUsize,
    forward_calls: AtomicUsize,
    cookie_calls: AtomicUsize,
    auto_cookies: AtomicBool,
}

impl MockBrowser {
    fn on_page(url: &str) -> Self {
        let browser = Self::default();
        *browser.location.lock().unwrap() = Some(url.to_string());
        browser
    }
}

#[async_trait]
impl BrowserControl for MockBrowser {
    async fn navigate(&self, target: &str) -> Result<String, BrowserError> {
        self.navigations.lock().unwrap().push(target.to_string());
        if target.is_empty() {
            return Err(BrowserError::EmptyTarget);
        }
        if self.fail_navigate.load(Ordering::SeqCst) {
            return Err(BrowserError::NavigationFailed("dns error".to_string()));
        }
        let url = format!("https://{}/", target);
        *self.location.lock().unwrap() = Some(url);
        Ok(format!("Navigated to {}", target))
    }

    async fn click(&self, element_text: &str) -> Result<String, BrowserError> {
        self.clicks.lock().unwrap().push(element_text.to_string());
        if self.fail_click.load(Ordering::SeqCst) {
            return Err(BrowserError::ElementNotFound);
        }
        Ok(format!("Clicked: {}", element_text))
    }

    async fn scroll(
        &self,
        direction: ScrollDirection,
        amount: ScrollAmount,
    ) -> Result<String, BrowserError> {
        self.scrolls.lock().unwrap().push((direction, amount));
        Ok("Scrolled".to_string())
    }

    async fn back(&self) -> Result<String, BrowserError> {
        self.back_calls.fetch_add(1, Ordering::SeqCst);
        Ok("Navigated back".to_string())
    }

    async fn forward(&self) -> Result<String, BrowserError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        Ok("Navigated forward".to_string())
    }

    async fn refresh(&self) -> Result<String, BrowserError> {
        Ok("Page refreshed".to_string())
    }

    async fn accept_cookies(&self) -> Result<String, BrowserError> {
        self.cookie_calls.fetch_add(1, Ordering::SeqCst);
        Ok("Cookies accepted".to_string())
    }

    async fn current_location(&self) -> Option<String> {
        self.location.lock().unwrap().clone()
    }

    async fn set_auto_cookies(&self, enabled: bool) {
        self.auto_cookies.store(enabled, Ordering::SeqCst);
    }

    async fn auto_cookies(&self) -> bool {
        self.auto_cookies.load(Ordering::SeqCst)
    }

    async fn close(&self) {}
}

#[derive(Default)]
struct MockSpeech {
    spoken: Mutex<Vec<String>>,
}

impl MockSpeech {
    fn last(&self) -> String {
        self.spoken.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn count(&self) -> usize {
        self.spoken.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechOutput for MockSpeech {
    async fn speak(&self, text: &str, _status: Arc<dyn StatusSink>) {
        self.spoken.lock().unwrap().push(text.to_string());
    }

    async fn stop(&self) {}
}

struct MockCapture {
    available: AtomicBool,
    captures: AtomicUsize,
}

impl Default for MockCapture {
    fn default() -> Self {
        Self {
            available: AtomicBool::new(true),
            captures: AtomicUsize::new(0),
        }
    }
}

static CAPTURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[async_trait]
impl PageCapture for MockCapture {
    async fn capture_full_page(&self) -> Option<CaptureHandle> {
        if !self.available.load(Ordering::SeqCst) {
            return None;
        }
        self.captures.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "voxweb-dispatch-test-{}-{}.png",
            std::process::id(),
            CAPTURE_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::write(&path, b"fake-png").ok()?;
        Some(CaptureHandle::new(path))
    }
}

struct FixedVision {
    calls: AtomicUsize,
}

impl Default for FixedVision {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VisionAnalyzer for FixedVision {
    async fn analyze(&self, _image: &[u8], mode: AnalysisMode) -> Result<String, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match mode {
            AnalysisMode::Describe => "A login page.".to_string(),
            AnalysisMode::Content => "Sign in with your account.".to_string(),
        })
    }
}

struct Fixture {
    browser: Arc<MockBrowser>,
    speech: Arc<MockSpeech>,
    capture: Arc<MockCapture>,
    vision: Arc<FixedVision>,
    engine: Arc<AnalysisEngine>,
    dispatcher: CommandDispatcher,
    status: Arc<dyn StatusSink>,
}

fn fixture(browser: MockBrowser) -> Fixture {
    let browser = Arc::new(browser);
    let speech = Arc::new(MockSpeech::default());
    let capture = Arc::new(MockCapture::default());
    let vision = Arc::new(FixedVision::default());
    let engine = Arc::new(AnalysisEngine::new(Some(vision.clone())));
    let dispatcher = CommandDispatcher::new(
        browser.clone(),
        speech.clone(),
        capture.clone(),
        engine.clone(),
    );
    Fixture {
        browser,
        speech,
        capture,
        vision,
        engine,
        dispatcher,
        status: Arc::new(NullStatusSink),
    }
}

#[tokio::test]
async fn test_navigate_success_enriches() {
    let f = fixture(MockBrowser::default());
    let outcome = f.dispatcher.dispatch("navigate to example.com", &f.status).await;

    assert!(outcome.success);
    assert!(outcome.should_enrich);
    assert_eq!(f.browser.navigations.lock().unwrap().as_slice(), ["example.com"]);
    assert_eq!(f.speech.last(), "Navigated to example.com");
}

#[tokio::test]
async fn test_navigate_failure() {
    let f = fixture(MockBrowser::default());
    f.browser.fail_navigate.store(true, Ordering::SeqCst);

    let outcome = f.dispatcher.dispatch("go to example.com", &f.status).await;
    assert!(!outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(f.speech.last(), "Navigation failed");
}

#[tokio::test]
async fn test_navigate_keyword_variants() {
    let f = fixture(MockBrowser::default());
    f.dispatcher.dispatch("go to wikipedia.org", &f.status).await;
    f.dispatcher.dispatch("open news.ycombinator.com", &f.status).await;

    assert_eq!(
        f.browser.navigations.lock().unwrap().as_slice(),
        ["wikipedia.org", "news.ycombinator.com"]
    );
}

#[tokio::test]
async fn test_navigate_is_case_insensitive() {
    let f = fixture(MockBrowser::default());
    let outcome = f.dispatcher.dispatch("Navigate To Example.com", &f.status).await;
    assert!(outcome.success);
    assert_eq!(f.browser.navigations.lock().unwrap().as_slice(), ["example.com"]);
}

#[tokio::test]
async fn test_describe_served_from_cache() {
    let f = fixture(MockBrowser::on_page("https://museum.example/"));
    f.engine
        .get_or_analyze_description("https://museum.example/", f.capture.capture_full_page().await.unwrap())
        .await;
    let calls_before = f.vision.calls.load(Ordering::SeqCst);

    let outcome = f.dispatcher.dispatch("describe the page", &f.status).await;
    assert!(outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(f.speech.last(), "A login page.");
    assert_eq!(f.vision.calls.load(Ordering::SeqCst), calls_before);
}

#[tokio::test]
async fn test_describe_cache_miss_analyzes_and_enriches() {
    let f = fixture(MockBrowser::on_page("https://login.example/"));

    let outcome = f.dispatcher.dispatch("describe", &f.status).await;
    assert!(outcome.success);
    assert!(outcome.should_enrich);
    assert_eq!(f.speech.last(), "A login page.");
    assert_eq!(
        f.engine.lookup_description("https://login.example/").await.as_deref(),
        Some("A login page.")
    );
}

#[tokio::test]
async fn test_describe_without_page() {
    let f = fixture(MockBrowser::default());

    let outcome = f.dispatcher.dispatch("describe", &f.status).await;
    assert!(!outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(f.speech.last(), "Not on any webpage");
    assert_eq!(f.capture.captures.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_describe_capture_unavailable() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));
    f.capture.available.store(false, Ordering::SeqCst);

    let outcome = f.dispatcher.dispatch("describe", &f.status).await;
    assert!(!outcome.success);
    assert!(outcome.should_enrich);
    assert_eq!(f.speech.last(), "Cannot capture page");
}

#[tokio::test]
async fn test_read_content_path() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    let outcome = f.dispatcher.dispatch("read the main content", &f.status).await;
    assert!(outcome.success);
    assert!(outcome.should_enrich);
    assert_eq!(f.speech.last(), "Sign in with your account.");
    assert!(f.engine.lookup_content("https://a.example/").await.is_some());
    assert!(f.engine.lookup_description("https://a.example/").await.is_none());
}

#[tokio::test]
async fn test_describe_outranks_read() {
    // "read and describe" matches both categories; describe wins by
    // priority order.
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    f.dispatcher.dispatch("read and describe", &f.status).await;
    assert_eq!(f.speech.last(), "A login page.");
    assert!(f.engine.lookup_description("https://a.example/").await.is_some());
    assert!(f.engine.lookup_content("https://a.example/").await.is_none());
}

#[tokio::test]
async fn test_click_with_target() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    let outcome = f.dispatcher.dispatch("click on the login button", &f.status).await;
    assert!(outcome.success);
    assert!(outcome.should_enrich);
    assert_eq!(f.browser.clicks.lock().unwrap().as_slice(), ["the login button"]);
    assert_eq!(f.speech.last(), "Clicked: the login button");
}

#[tokio::test]
async fn test_click_without_target_asks() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    let outcome = f.dispatcher.dispatch("click", &f.status).await;
    assert!(!outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(f.speech.last(), "What should I click?");
    assert!(f.browser.clicks.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_click_element_not_found() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));
    f.browser.fail_click.store(true, Ordering::SeqCst);

    let outcome = f.dispatcher.dispatch("click submit", &f.status).await;
    assert!(!outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(f.speech.last(), "Element not found");
}

#[tokio::test]
async fn test_click_outranks_back() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    f.dispatcher.dispatch("click the back button", &f.status).await;
    assert_eq!(f.browser.clicks.lock().unwrap().as_slice(), ["the back button"]);
    assert_eq!(f.browser.back_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_scroll_to_top() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    let outcome = f.dispatcher.dispatch("scroll to top", &f.status).await;
    assert!(outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(
        f.browser.scrolls.lock().unwrap().as_slice(),
        [(ScrollDirection::Up, ScrollAmount::Top)]
    );
}

#[tokio::test]
async fn test_scroll_variants() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    f.dispatcher.dispatch("scroll down", &f.status).await;
    f.dispatcher.dispatch("scroll up", &f.status).await;
    f.dispatcher.dispatch("scroll to bottom", &f.status).await;

    assert_eq!(
        f.browser.scrolls.lock().unwrap().as_slice(),
        [
            (ScrollDirection::Down, ScrollAmount::Page),
            (ScrollDirection::Up, ScrollAmount::Page),
            (ScrollDirection::Down, ScrollAmount::Bottom),
        ]
    );
}

#[tokio::test]
async fn test_back_and_forward() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    let outcome = f.dispatcher.dispatch("go back", &f.status).await;
    assert!(outcome.success);
    assert!(outcome.should_enrich);
    assert_eq!(f.browser.back_calls.load(Ordering::SeqCst), 1);

    let outcome = f.dispatcher.dispatch("forward", &f.status).await;
    assert!(outcome.success);
    assert!(outcome.should_enrich);
    assert_eq!(f.browser.forward_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_accept_cookies() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));

    let outcome = f.dispatcher.dispatch("accept cookies", &f.status).await;
    assert!(outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(f.speech.last(), "Cookies accepted");

    // Singular form triggers the same category.
    f.dispatcher.dispatch("accept cookie", &f.status).await;
    assert_eq!(f.browser.cookie_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_help() {
    let f = fixture(MockBrowser::default());

    let outcome = f.dispatcher.dispatch("help", &f.status).await;
    assert!(outcome.success);
    assert!(!outcome.should_enrich);
    assert!(f.speech.last().starts_with("Available commands"));
}

#[tokio::test]
async fn test_unrecognized_command() {
    let f = fixture(MockBrowser::default());

    let outcome = f.dispatcher.dispatch("make me a sandwich", &f.status).await;
    assert!(!outcome.success);
    assert!(!outcome.should_enrich);
    assert_eq!(f.speech.last(), "Command not recognized");
}

#[tokio::test]
async fn test_every_branch_speaks_once() {
    let f = fixture(MockBrowser::on_page("https://a.example/"));
    let commands = [
        "navigate to example.com",
        "describe",
        "read",
        "click submit",
        "scroll down",
        "back",
        "forward",
        "accept cookies",
        "help",
        "gibberish",
    ];

    for (i, command) in commands.iter().enumerate() {
        f.dispatcher.dispatch(command, &f.status).await;
        assert_eq!(f.speech.count(), i + 1, "command {:?} spoke more than once", command);
    }
}
