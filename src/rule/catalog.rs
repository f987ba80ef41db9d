//! 签名目录：编译后签名的只读有序集合
//! 进程内加载一次，之后不可变，可在并发检测间共享

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::model::SignatureRule;
use crate::compiler::{CompiledSignature, SignatureCompiler};
use crate::error::TdResult;

/// 内置签名数据（JSON）
static BUILTIN_SIGNATURES_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/signatures.json"));

/// 全局懒加载的内置签名目录，首次访问时编译，内存中仅一份实例
static BUILTIN_CATALOG: Lazy<Arc<SignatureCatalog>> = Lazy::new(|| {
    let catalog = SignatureCatalog::from_json(BUILTIN_SIGNATURES_JSON).unwrap_or_else(|e| {
        eprintln!("致命错误: 内置签名目录编译失败 - {}", e);
        panic!("内置签名目录异常，请检查 data/signatures.json");
    });
    Arc::new(catalog)
});

/// 签名目录
#[derive(Debug, Clone, Default)]
pub struct SignatureCatalog {
    signatures: Vec<CompiledSignature>,
}

impl SignatureCatalog {
    /// 获取内置签名目录
    pub fn builtin() -> Arc<SignatureCatalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    /// 从 JSON 文本解析并编译签名目录
    pub fn from_json(json: &str) -> TdResult<Self> {
        let rules: Vec<SignatureRule> = serde_json::from_str(json)?;
        Self::from_rules(&rules)
    }

    /// 从原始规则编译签名目录
    pub fn from_rules(rules: &[SignatureRule]) -> TdResult<Self> {
        let signatures = SignatureCompiler::compile(rules)?;
        debug!("签名目录加载完成，签名数：{}", signatures.len());
        Ok(Self { signatures })
    }

    /// 直接由编译后签名构建（测试及嵌入式调用方使用）
    pub fn from_signatures(signatures: Vec<CompiledSignature>) -> Self {
        Self { signatures }
    }

    /// 按目录顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &CompiledSignature> {
        self.signatures.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CompiledSignature> {
        self.signatures.iter().find(|signature| signature.name == name)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl<'a> IntoIterator for &'a SignatureCatalog {
    type Item = &'a CompiledSignature;
    type IntoIter = std::slice::Iter<'a, CompiledSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.signatures.iter()
    }
}
