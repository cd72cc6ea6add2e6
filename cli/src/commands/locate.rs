use super::{AppContext, PocketmarkCommand};
use pocketmark::error::Result;
use pocketmark::store::{Browser, HomeDirs, Os, ProfileLocator};

pub struct LocateCommand {
    pub browser: Option<Browser>,
    pub firefox_profile: Option<String>,
}

impl PocketmarkCommand for LocateCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let os = Os::current();
        let browser = self
            .browser
            .or(ctx.config.browser)
            .unwrap_or_else(|| Browser::default_for(os));
        let profile = self
            .firefox_profile
            .as_deref()
            .or(ctx.config.firefox_profile.as_deref());

        let locator = ProfileLocator::new(HomeDirs::from_env()?);
        let path = locator.locate_with_profile(os, browser, profile)?;
        println!("{}", path.display());
        Ok(())
    }
}
