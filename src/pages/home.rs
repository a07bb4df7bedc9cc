//! Storefront home page object
//!
//! Locators were derived from the captured HTML snapshot of the home page;
//! re-capture and review them when the UI changes.

use async_trait::async_trait;

use crate::browser::Browser;
use crate::core::Result;
use crate::driver::Locator;
use crate::pages::Page;

/// Page Object for the storefront home page
pub struct HomePage<'a> {
    browser: &'a Browser,
}

impl<'a> HomePage<'a> {
    /// Snapshot subject for this page
    pub const NAME: &'static str = "HomePage";

    pub fn new(browser: &'a Browser) -> Self {
        Self { browser }
    }

    // Header
    fn search_input() -> Locator {
        Locator::css("input[type='text'][placeholder='Search Products']")
    }

    fn search_icon() -> Locator {
        Locator::css(".search-cont .icon")
    }

    fn cart_icon() -> Locator {
        Locator::css(".social-icon-cont .headerIcon:nth-child(3) svg")
    }

    fn logo() -> Locator {
        Locator::css(".logo-search-cont img[alt='Logo']")
    }

    // Navigation
    fn nav_home() -> Locator {
        Locator::css(".anim-nav a[href='/']")
    }

    fn nav_shop() -> Locator {
        Locator::css(".anim-nav a[href='/store']")
    }

    // Main banner
    fn shop_now_button() -> Locator {
        Locator::css(".content-sec-one .shop-now-btn button")
    }

    /// Open the home page at the configured base URL and capture its HTML
    pub async fn open(&self) -> Result<()> {
        self.browser.open_base(Self::NAME).await
    }

    /// Search for a product and submit
    pub async fn search_for(&self, product: &str) -> Result<()> {
        self.browser.type_text(&Self::search_input(), product).await?;
        self.browser.click(&Self::search_icon()).await
    }

    /// Type into the search box without submitting
    pub async fn enter_search_text(&self, text: &str) -> Result<()> {
        self.browser.type_text(&Self::search_input(), text).await
    }

    /// Navigate to the shop via the nav bar
    pub async fn click_shop_nav(&self) -> Result<()> {
        self.browser.click(&Self::nav_shop()).await
    }

    /// Navigate home via the nav bar
    pub async fn click_home_nav(&self) -> Result<()> {
        self.browser.click(&Self::nav_home()).await
    }

    /// Open the shopping cart from the header
    pub async fn click_cart_icon(&self) -> Result<()> {
        self.browser.click(&Self::cart_icon()).await
    }

    /// Click the main banner's shop-now button
    pub async fn click_shop_now(&self) -> Result<()> {
        self.browser.click(&Self::shop_now_button()).await
    }
}

#[async_trait]
impl Page for HomePage<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn browser(&self) -> &Browser {
        self.browser
    }

    async fn is_loaded(&self) -> Result<bool> {
        Ok(self.browser.is_visible(&Self::logo(), None).await)
    }
}
