use crate::collaborators::{ListenerId, ScrollHost};
use std::sync::Arc;
use tracing::debug;

/// 滚动监听注册
///
/// 持有期间宿主把滚动事件转交给会话；显式 `detach` 或 drop 时注销，最多一次
pub struct ScrollSubscription {
    host: Arc<dyn ScrollHost>,
    id: Option<ListenerId>,
}

impl ScrollSubscription {
    pub fn attach(host: Arc<dyn ScrollHost>) -> Self {
        let id = host.attach();
        debug!(listener = id.0, "scroll listener attached");
        Self { host, id: Some(id) }
    }

    pub fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.host.detach(id);
            debug!(listener = id.0, "scroll listener detached");
        }
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}
