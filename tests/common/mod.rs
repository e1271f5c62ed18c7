// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::sync::Arc;

use pagelingo::core::{
    DispatchOutcome, Dispatcher, DispatcherOptions, DocumentKind, DocumentRequest,
};
use pagelingo::translation::{MockGateway, MockReply};

/// 测试环境：本地网关加分发器
#[allow(dead_code)]
pub struct TestEnvironment {
    pub gateway: Arc<MockGateway>,
    pub dispatcher: Arc<Dispatcher>,
}

#[allow(dead_code)]
impl TestEnvironment {
    pub fn with_gateway(gateway: MockGateway) -> Self {
        let gateway = Arc::new(gateway);
        let dispatcher = Arc::new(Dispatcher::new(gateway.clone(), DispatcherOptions::default()));
        Self {
            gateway,
            dispatcher,
        }
    }

    pub fn identity() -> Self {
        Self::with_gateway(MockGateway::identity())
    }

    pub fn dictionary(pairs: &[(&str, &str)]) -> Self {
        Self::with_gateway(MockGateway::dictionary(pairs.iter().copied()))
    }

    pub fn reply(reply: MockReply) -> Self {
        Self::with_gateway(MockGateway::new(reply))
    }

    /// 翻译标记文档，失败时让测试失败
    pub async fn markup(&self, text: &str, lang: &str) -> DispatchOutcome {
        self.dispatch(DocumentRequest::new(text, DocumentKind::Markup, lang))
            .await
    }

    /// 翻译脚本，`path` 决定方言
    pub async fn script(&self, text: &str, path: &str, lang: &str) -> DispatchOutcome {
        self.dispatch(DocumentRequest::new(text, DocumentKind::Script, lang).with_path(path))
            .await
    }

    pub async fn dispatch(&self, request: DocumentRequest) -> DispatchOutcome {
        self.dispatcher
            .dispatch(request)
            .await
            .expect("dispatch should succeed")
    }

    /// 网关收到的全部批次
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.gateway
            .calls()
            .into_iter()
            .map(|(_, batch)| batch)
            .collect()
    }

    /// 唯一一次调用的批次，没有调用时为空
    pub fn single_batch(&self) -> Vec<String> {
        let batches = self.batches();
        assert!(batches.len() <= 1, "Expected at most one gateway call, got {}", batches.len());
        batches.into_iter().next().unwrap_or_default()
    }
}

/// 测试数据
#[allow(dead_code)]
pub mod fixtures {
    pub const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Welcome home</title>
<style>.hero { color: red; }</style>
<script>document.querySelector(".hero").addEventListener("click", go);</script>
</head>
<body>
<h1>Welcome home</h1>
<p>Plan your next trip with us.</p>
<input placeholder="Search destinations" data-track="hero-search">
<a href="/deals" title="See all deals">/deals</a>
<pre>cargo run --release</pre>
<img src="hero.png" alt="Beach at sunset">
</body>
</html>
"#;

    pub const APP_SCRIPT: &str = r##"import { track } from "./analytics.js";
const button = document.querySelector("#save-btn");
button.addEventListener("click", () => track("utm_source"));
button.textContent = "Save changes";
const labels = ["#save-btn", "Save"];
const status = { title: "All changes saved", id: "status-ok" };
if (mode === "compact") {
  console.log("Switching to the compact layout");
}
"##;
}
