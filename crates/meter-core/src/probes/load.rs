//! Image / script load probes: did the resource load at all?

use async_trait::async_trait;
use url::Url;

use super::{ProbeSession, ProbeStrategy};
use crate::domain::{Outcome, ProbeError};
use crate::ports::{Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProbe {
    resource: Resource,
}

impl LoadProbe {
    pub fn image(url: Url) -> Self {
        Self {
            resource: Resource::image(url),
        }
    }

    pub fn script(url: Url) -> Self {
        Self {
            resource: Resource::script(url),
        }
    }
}

#[async_trait(?Send)]
impl ProbeStrategy for LoadProbe {
    fn name(&self) -> &'static str {
        match self.resource.kind {
            ResourceKind::Image => "img",
            ResourceKind::Script => "script",
            ResourceKind::Iframe => "iframe",
        }
    }

    async fn execute(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError> {
        let settled = session.load(self.resource.clone()).await?;
        session.reporter.submit(Outcome::verdict(settled.loaded()));
        Ok(())
    }
}
