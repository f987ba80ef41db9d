//! HTML标签提取器
//! 基于流式分词，提取 title / meta / script / 样式表 以及响应头线索

use std::cell::RefCell;
use std::collections::BTreeMap;

use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use markup5ever::interface::Attribute;
use tendril::StrTendril;
use url::Url;

use super::snapshot::ResourceEntry;

/// 可由 meta http-equiv 推断出的响应头
const HEADER_HINT_NAMES: [&str; 2] = ["strict-transport-security", "content-security-policy"];

/// 响应头线索的统一取值
pub const HEADER_HINT_VALUE: &str = "detected";

/// 提取结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedSignals {
    pub title: String,
    pub meta: BTreeMap<String, String>,
    pub scripts: Vec<ResourceEntry>,
    pub stylesheets: Vec<ResourceEntry>,
    pub header_hints: BTreeMap<String, String>,
}

/// 正在采集文本的原始文本元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawTarget {
    Script,
    Style,
    Title,
}

impl RawTarget {
    fn tag_name(self) -> &'static str {
        match self {
            RawTarget::Script => "script",
            RawTarget::Style => "style",
            RawTarget::Title => "title",
        }
    }
}

#[derive(Debug, Default)]
struct SinkState {
    signals: ExtractedSignals,
    capture: Option<(RawTarget, String)>,
    title_seen: bool,
}

/// HTML提取器（分词器 sink）
#[derive(Debug, Default)]
pub struct HtmlExtractor {
    base: Option<Url>,
    state: RefCell<SinkState>,
}

impl TokenSink for HtmlExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(Tag {
                kind: TagKind::StartTag,
                name,
                attrs,
                ..
            }) => match &*name {
                "script" => {
                    self.extract_script_src(&attrs);
                    self.begin_capture(RawTarget::Script);
                    return TokenSinkResult::RawData(RawKind::ScriptData);
                }
                "style" => {
                    self.begin_capture(RawTarget::Style);
                    return TokenSinkResult::RawData(RawKind::Rawtext);
                }
                "title" => {
                    self.begin_capture(RawTarget::Title);
                    return TokenSinkResult::RawData(RawKind::Rcdata);
                }
                "link" => self.extract_stylesheet_link(&attrs),
                "meta" => self.extract_meta_tag(&attrs),
                _ => {}
            },
            Token::TagToken(Tag {
                kind: TagKind::EndTag,
                name,
                ..
            }) => {
                let closes_capture = matches!(
                    &self.state.borrow().capture,
                    Some((target, _)) if target.tag_name() == &*name
                );
                if closes_capture {
                    self.finish_capture();
                }
            }
            Token::CharacterTokens(text) => {
                if let Some((_, buffer)) = self.state.borrow_mut().capture.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Token::EOFToken => self.finish_capture(),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

impl HtmlExtractor {
    /// 创建提取器，`base` 用于解析相对地址
    pub fn new(base: Option<Url>) -> Self {
        Self {
            base,
            state: RefCell::default(),
        }
    }

    /// 从HTML字符串提取信号
    pub fn extract(self, html: &str) -> ExtractedSignals {
        let tokenizer = Tokenizer::new(self, TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from_slice(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink.state.into_inner().signals
    }

    /// 相对地址按页面地址补全，失败时保留原值
    fn resolve(&self, raw: &str) -> String {
        self.base
            .as_ref()
            .and_then(|base| base.join(raw).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| raw.to_string())
    }

    fn attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
        attrs
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| &*attr.value)
    }

    fn extract_script_src(&self, attrs: &[Attribute]) {
        if let Some(src) = Self::attr(attrs, "src").map(str::trim).filter(|s| !s.is_empty()) {
            let resolved = self.resolve(src);
            self.state
                .borrow_mut()
                .signals
                .scripts
                .push(ResourceEntry::Url(resolved));
        }
    }

    fn extract_stylesheet_link(&self, attrs: &[Attribute]) {
        let is_stylesheet = Self::attr(attrs, "rel")
            .is_some_and(|rel| rel.to_ascii_lowercase().contains("stylesheet"));
        if !is_stylesheet {
            return;
        }
        if let Some(href) = Self::attr(attrs, "href").map(str::trim).filter(|s| !s.is_empty()) {
            let resolved = self.resolve(href);
            self.state
                .borrow_mut()
                .signals
                .stylesheets
                .push(ResourceEntry::Url(resolved));
        }
    }

    /// 提取meta标签：名称取 name > property > http-equiv，名称与内容均需非空
    fn extract_meta_tag(&self, attrs: &[Attribute]) {
        let non_empty = |key: &str| Self::attr(attrs, key).filter(|v| !v.is_empty());
        let http_equiv = non_empty("http-equiv");
        let name = non_empty("name").or_else(|| non_empty("property")).or(http_equiv);
        let content = non_empty("content");

        let mut state = self.state.borrow_mut();
        if let (Some(n), Some(c)) = (name, content) {
            state.signals.meta.insert(n.to_lowercase(), c.to_string());
        }

        if let Some(equiv) = http_equiv.map(str::to_ascii_lowercase) {
            for hint in HEADER_HINT_NAMES {
                if equiv.contains(hint) {
                    state
                        .signals
                        .header_hints
                        .insert(hint.to_string(), HEADER_HINT_VALUE.to_string());
                }
            }
        }
    }

    fn begin_capture(&self, target: RawTarget) {
        let mut state = self.state.borrow_mut();
        state.capture = Some((target, String::new()));
    }

    fn finish_capture(&self) {
        let mut state = self.state.borrow_mut();
        let Some((target, text)) = state.capture.take() else {
            return;
        };

        match target {
            RawTarget::Script if !text.trim().is_empty() => {
                state.signals.scripts.push(ResourceEntry::Inline(text));
            }
            RawTarget::Style if !text.trim().is_empty() => {
                state.signals.stylesheets.push(ResourceEntry::Inline(text));
            }
            RawTarget::Title if !state.title_seen => {
                state.title_seen = true;
                state.signals.title = text.split_whitespace().collect::<Vec<_>>().join(" ");
            }
            _ => {}
        }
    }
}
