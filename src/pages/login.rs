//! Storefront login page object
//!
//! The login form lives at `{base_url}auth`.

use async_trait::async_trait;

use crate::browser::Browser;
use crate::core::{PommelError, Result};
use crate::driver::Locator;
use crate::pages::Page;

/// Page Object for the storefront authentication page
pub struct LoginPage<'a> {
    browser: &'a Browser,
}

impl<'a> LoginPage<'a> {
    /// Snapshot subject for this page
    pub const NAME: &'static str = "LoginPage";

    pub fn new(browser: &'a Browser) -> Self {
        Self { browser }
    }

    // Form
    fn email_input() -> Locator {
        Locator::css("input[type='email'][placeholder='Email address']")
    }

    fn password_input() -> Locator {
        Locator::css("input[type='password'][placeholder='Password']")
    }

    fn sign_in_button() -> Locator {
        Locator::css("button[type='submit'].submit-btn")
    }

    // Links
    fn create_account_link() -> Locator {
        Locator::css("a.switch-link")
    }

    fn home_link() -> Locator {
        Locator::css("a.home-link")
    }

    fn header_title_locator() -> Locator {
        Locator::css(".header-title")
    }

    /// Navigate to the authentication page and capture its HTML
    pub async fn navigate(&self) -> Result<()> {
        let url = self.browser.base_join("auth")?;
        self.browser.open(&url, Self::NAME).await
    }

    /// Whether the current URL is the auth page
    pub async fn is_on_login_page(&self) -> Result<bool> {
        let url = self.browser.current_url().await?;
        Ok(url.to_lowercase().contains("auth"))
    }

    /// Log in with the given credentials
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.browser
            .type_text(&Self::email_input(), username)
            .await?;
        self.browser
            .type_text(&Self::password_input(), password)
            .await?;
        self.browser.click(&Self::sign_in_button()).await
    }

    /// Log in with the credentials from config
    pub async fn login_with_config(&self) -> Result<()> {
        let test_data = &self.browser.config().test_data;
        let username = test_data
            .username
            .as_deref()
            .ok_or_else(|| PommelError::config("test_data.username not set"))?;
        let password = test_data
            .password
            .as_deref()
            .ok_or_else(|| PommelError::config("test_data.password not set"))?;
        self.login(username, password).await
    }

    /// Click the 'Create a new account' link
    pub async fn click_create_account(&self) -> Result<()> {
        self.browser.click(&Self::create_account_link()).await
    }

    /// Click the 'Go to Home' link
    pub async fn click_go_to_home(&self) -> Result<()> {
        self.browser.click(&Self::home_link()).await
    }

    /// Text of the auth form header
    pub async fn header_title(&self) -> Result<String> {
        self.browser.text(&Self::header_title_locator()).await
    }
}

#[async_trait]
impl Page for LoginPage<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn browser(&self) -> &Browser {
        self.browser
    }

    async fn is_loaded(&self) -> Result<bool> {
        Ok(self
            .browser
            .is_visible(&Self::email_input(), None)
            .await)
    }
}
