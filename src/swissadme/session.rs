use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};

/// A4 in inches, the unit Chrome's print API expects.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Opens one isolated browser session per compound.
pub trait SessionLauncher: Send + Sync + 'static {
    type Session: BrowserSession + Send;

    fn launch(&self, user_agent: &str) -> eyre::Result<Self::Session>;
}

/// The handful of page interactions the SwissADME form needs.
///
/// Selectors are CSS unless the method name says xpath. Release methods are called
/// page → context → browser and must tolerate being called after a partial launch.
pub trait BrowserSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> eyre::Result<()>;
    fn click(&mut self, selector: &str, timeout: Duration) -> eyre::Result<()>;
    fn click_xpath(&mut self, xpath: &str, timeout: Duration) -> eyre::Result<()>;
    fn type_text(&mut self, text: &str, per_char_delay: Duration) -> eyre::Result<()>;
    fn wait_for_xpath(&mut self, xpath: &str, timeout: Duration) -> eyre::Result<()>;
    fn inner_text(&mut self, xpath: &str, timeout: Duration) -> eyre::Result<String>;
    fn print_pdf(&mut self) -> eyre::Result<Vec<u8>>;

    fn close_page(&mut self) -> eyre::Result<()>;
    fn close_context(&mut self) -> eyre::Result<()>;
    fn close_browser(&mut self) -> eyre::Result<()>;
}

/// Launches a fresh headless Chrome for every session.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    pub chrome_path: Option<PathBuf>,
    pub headful: bool,
}

impl ChromeLauncher {
    pub fn new(chrome_path: Option<PathBuf>, headful: bool) -> Self {
        Self {
            chrome_path,
            headful,
        }
    }
}

impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self, user_agent: &str) -> eyre::Result<ChromeSession> {
        let options = LaunchOptions::default_builder()
            .headless(!self.headful)
            .path(self.chrome_path.clone())
            // Long waits on the results page must not trip the idle watchdog.
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| eyre::eyre!("invalid browser launch options: {e}"))?;

        let browser =
            Browser::new(options).map_err(|e| eyre::eyre!("failed to launch browser: {e}"))?;
        let mut session = ChromeSession {
            browser: Some(browser),
            context_id: None,
            tab: None,
        };
        session.open_page(user_agent)?;

        Ok(session)
    }
}

pub struct ChromeSession {
    browser: Option<Browser>,
    context_id: Option<String>,
    tab: Option<Arc<Tab>>,
}

impl ChromeSession {
    fn open_page(&mut self, user_agent: &str) -> eyre::Result<()> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| eyre::eyre!("browser already closed"))?;

        let context = browser
            .new_context()
            .map_err(|e| eyre::eyre!("failed to create browser context: {e}"))?;
        self.context_id = Some(context.get_id().to_string());

        let tab = context
            .new_tab()
            .map_err(|e| eyre::eyre!("failed to open page: {e}"))?;
        tab.set_user_agent(user_agent, None, None)
            .map_err(|e| eyre::eyre!("failed to set user agent: {e}"))?;
        self.tab = Some(tab);

        Ok(())
    }

    fn tab(&self) -> eyre::Result<&Arc<Tab>> {
        self.tab.as_ref().ok_or_else(|| eyre::eyre!("page is not open"))
    }
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> eyre::Result<()> {
        let tab = self.tab()?;
        tab.set_default_timeout(timeout);
        tab.navigate_to(url)
            .map_err(|e| eyre::eyre!("navigation to {url} failed: {e}"))?
            .wait_until_navigated()
            .map_err(|e| eyre::eyre!("{url} did not finish loading: {e}"))?;
        Ok(())
    }

    fn click(&mut self, selector: &str, timeout: Duration) -> eyre::Result<()> {
        self.tab()?
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| eyre::eyre!("{selector} never appeared: {e}"))?
            .click()
            .map_err(|e| eyre::eyre!("failed to click {selector}: {e}"))?;
        Ok(())
    }

    fn click_xpath(&mut self, xpath: &str, timeout: Duration) -> eyre::Result<()> {
        self.tab()?
            .wait_for_xpath_with_custom_timeout(xpath, timeout)
            .map_err(|e| eyre::eyre!("{xpath} never appeared: {e}"))?
            .click()
            .map_err(|e| eyre::eyre!("failed to click {xpath}: {e}"))?;
        Ok(())
    }

    fn type_text(&mut self, text: &str, per_char_delay: Duration) -> eyre::Result<()> {
        let tab = self.tab()?;
        let mut buf = [0u8; 4];
        for c in text.chars() {
            tab.type_str(c.encode_utf8(&mut buf))
                .map_err(|e| eyre::eyre!("failed to type {c:?}: {e}"))?;
            std::thread::sleep(per_char_delay);
        }
        Ok(())
    }

    fn wait_for_xpath(&mut self, xpath: &str, timeout: Duration) -> eyre::Result<()> {
        self.tab()?
            .wait_for_xpath_with_custom_timeout(xpath, timeout)
            .map_err(|e| eyre::eyre!("{xpath} never appeared: {e}"))?;
        Ok(())
    }

    fn inner_text(&mut self, xpath: &str, timeout: Duration) -> eyre::Result<String> {
        self.tab()?
            .wait_for_xpath_with_custom_timeout(xpath, timeout)
            .map_err(|e| eyre::eyre!("{xpath} never appeared: {e}"))?
            .get_inner_text()
            .map_err(|e| eyre::eyre!("failed to read {xpath}: {e}"))
    }

    fn print_pdf(&mut self) -> eyre::Result<Vec<u8>> {
        let options = PrintToPdfOptions {
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            print_background: Some(true),
            ..Default::default()
        };
        self.tab()?
            .print_to_pdf(Some(options))
            .map_err(|e| eyre::eyre!("failed to render pdf: {e}"))
    }

    fn close_page(&mut self) -> eyre::Result<()> {
        if let Some(tab) = self.tab.take() {
            tab.close(false)
                .map_err(|e| eyre::eyre!("failed to close page: {e}"))?;
        }
        Ok(())
    }

    fn close_context(&mut self) -> eyre::Result<()> {
        // headless_chrome has no public dispose for a context; it goes away when
        // close_browser drops the process. This only forgets the id.
        if let Some(id) = self.context_id.take() {
            if self.tab.is_some() {
                return Err(eyre::eyre!("context {id} still has an open page"));
            }
            log::debug!("browser context {} left to close with the browser", id);
        }
        Ok(())
    }

    fn close_browser(&mut self) -> eyre::Result<()> {
        // Dropping the handle kills the chrome process.
        drop(self.browser.take());
        Ok(())
    }
}
