use dwell_engine::sim::NavigationSink;
use tracing::info;

/// Logs each navigation request. The host has no browser to hand the target
/// to, so the last one is kept for the window title.
#[derive(Debug)]
pub(crate) struct TracingNavigationSink {
    scene_name: &'static str,
    last_target: Option<String>,
    fired: u32,
}

impl TracingNavigationSink {
    pub(crate) fn new(scene_name: &'static str) -> Self {
        Self {
            scene_name,
            last_target: None,
            fired: 0,
        }
    }

    pub(crate) fn last_target(&self) -> Option<&str> {
        self.last_target.as_deref()
    }

    pub(crate) fn fired(&self) -> u32 {
        self.fired
    }
}

impl NavigationSink for TracingNavigationSink {
    fn navigate(&mut self, target: &str) {
        self.fired = self.fired.saturating_add(1);
        info!(
            scene = self.scene_name,
            target,
            count = self.fired,
            "navigate"
        );
        self.last_target = Some(target.to_string());
    }
}
