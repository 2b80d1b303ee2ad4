use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            browser::tab_page::TabPage,
            dom::DomTree,
            error::{BrowserError, Result}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// A Chrome/Chromium process, launched or attached over CDP
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Start Chrome with one open tab
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Feed pages refuse to render for obviously automated browsers
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // A watch session can sit idle for a long time between compose requests
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = options.chrome_path;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser })
    }

    /// Attach to a browser started with `--remote-debugging-port`
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser })
    }

    /// The active tab as a composer page
    pub fn page(&self) -> Result<TabPage> {
        Ok(TabPage::new(self.active_tab()?))
    }

    fn tabs(&self) -> Result<Vec<Arc<Tab>>> {
        match self.browser.get_tabs().lock() {
            Ok(tabs) => Ok(tabs.clone()),
            Err(e) => Err(BrowserError::TabOperationFailed(format!("Tab list poisoned: {}", e))),
        }
    }

    /// The tab the user is looking at
    pub fn active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.tabs()?;

        // Visible and focused first, then merely visible
        for check in ["document.visibilityState === 'visible' && document.hasFocus()", "document.visibilityState === 'visible'"] {
            for tab in &tabs {
                let shown = match tab.evaluate(check, false) {
                    Ok(result) => result.value.and_then(|v| v.as_bool()).unwrap_or(false),
                    Err(e) => {
                        log::debug!("Visibility check failed on {}: {}", tab.get_url(), e);
                        false
                    }
                };
                if shown {
                    return Ok(Arc::clone(tab));
                }
            }
        }

        // A fresh headless browser reports no focused tab; fall back to the first one
        tabs.first()
            .cloned()
            .ok_or_else(|| BrowserError::TabOperationFailed("Browser has no open tabs".to_string()))
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.active_tab()?;
        tab.navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("{}: {}", url, e)))?;
        Ok(())
    }

    /// Block until the active tab finishes loading
    pub fn wait_for_navigation(&self) -> Result<()> {
        let tab = self.active_tab()?;
        tab.wait_until_navigated()
            .map_err(|e| BrowserError::NavigationFailed(format!("Page did not finish loading: {}", e)))?;
        Ok(())
    }

    /// Snapshot the DOM of the active tab
    pub fn extract_dom(&self) -> Result<DomTree> {
        DomTree::from_tab(&self.active_tab()?)
    }

    /// Close every tab; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.tabs()? {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab: {}", e);
            }
        }
        Ok(())
    }
}
