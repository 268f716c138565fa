//! Content sources for emitted files
//!
//! Content is either a concrete value (text or bytes) or a function of the
//! current asset map. Functions may return another function; resolution keeps
//! calling until a concrete value or [`Content::Skip`] is reached.

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

use crate::host::{AssetMap, RawSource};

/// Function deriving content from the current asset map
pub type ContentFn =
    Arc<dyn for<'a> Fn(&'a AssetMap) -> BoxFuture<'a, anyhow::Result<Content>> + Send + Sync>;

/// Content to emit
#[derive(Clone)]
pub enum Content {
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Content computed from the current assets, possibly asynchronously
    Derived(ContentFn),
    /// Nothing to emit
    Skip,
}

impl Content {
    /// Content derived synchronously from the current assets
    ///
    /// # Example
    ///
    /// ```rust
    /// use fob_plugin_emit_file::Content;
    ///
    /// let content = Content::from_fn(|assets| Content::from(assets.len().to_string()));
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&AssetMap) -> Content + Send + Sync + 'static,
    {
        Self::from_async_fn(move |assets| {
            let content = f(assets);
            Box::pin(async move { Ok(content) })
        })
    }

    /// Content derived from the current assets by a fallible async function
    ///
    /// The returned future may borrow the asset map.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fob_plugin_emit_file::Content;
    ///
    /// let content = Content::from_async_fn(|assets| {
    ///     Box::pin(async move {
    ///         let names: Vec<&str> = assets.keys().map(String::as_str).collect();
    ///         Ok(Content::from(names.join("\n")))
    ///     })
    /// });
    /// ```
    pub fn from_async_fn<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a AssetMap) -> BoxFuture<'a, anyhow::Result<Content>>
            + Send
            + Sync
            + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    /// Whether this content needs the asset map to resolve
    pub fn is_derived(&self) -> bool {
        matches!(self, Content::Derived(_))
    }

    /// Resolve to a concrete source, awaiting derived content
    ///
    /// Returns `Ok(None)` when resolution ends in [`Content::Skip`]. Errors
    /// from content functions are returned unchanged.
    pub async fn resolve(&self, assets: &AssetMap) -> anyhow::Result<Option<RawSource>> {
        let mut current = self.clone();
        loop {
            current = match current {
                Content::Text(text) => return Ok(Some(RawSource::from(text))),
                Content::Bytes(bytes) => return Ok(Some(RawSource::from(bytes))),
                Content::Skip => return Ok(None),
                Content::Derived(f) => f(assets).await?,
            };
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Content::Bytes(bytes) => f
                .debug_tuple("Bytes")
                .field(&format_args!("{} bytes", bytes.len()))
                .finish(),
            Content::Derived(_) => f.write_str("Derived(<fn>)"),
            Content::Skip => f.write_str("Skip"),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Content::Bytes(bytes.to_vec())
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        value.map_or(Content::Skip, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> AssetMap {
        let mut assets = AssetMap::default();
        assets.insert("main.js".to_string(), RawSource::from("console.log(1)"));
        assets.insert("style.css".to_string(), RawSource::from("body{}"));
        assets
    }

    #[tokio::test]
    async fn test_resolve_literal_text() {
        let source = Content::from("hello").resolve(&assets()).await.unwrap();
        assert_eq!(source.unwrap().as_bytes(), b"hello");
    }

    #[tokio::test]
    async fn test_resolve_literal_bytes() {
        let source = Content::from(vec![0u8, 159, 146, 150])
            .resolve(&assets())
            .await
            .unwrap();
        assert_eq!(source.unwrap().as_bytes(), &[0u8, 159, 146, 150]);
    }

    #[tokio::test]
    async fn test_resolve_function_sees_assets() {
        let content = Content::from_fn(|assets| {
            let mut names: Vec<&str> = assets.keys().map(String::as_str).collect();
            names.sort_unstable();
            Content::from(names.join(","))
        });
        let source = content.resolve(&assets()).await.unwrap().unwrap();
        assert_eq!(source.as_bytes(), b"main.js,style.css");
    }

    #[tokio::test]
    async fn test_resolve_chained_functions() {
        let content = Content::from_fn(|_| {
            Content::from_async_fn(|assets| {
                let count = assets.len();
                Box::pin(async move { Ok(Content::from(format!("{count} assets"))) })
            })
        });
        let source = content.resolve(&assets()).await.unwrap().unwrap();
        assert_eq!(source.as_bytes(), b"2 assets");
    }

    #[tokio::test]
    async fn test_resolve_skip_yields_none() {
        let content = Content::from_fn(|_| Content::Skip);
        assert!(content.resolve(&assets()).await.unwrap().is_none());
        assert!(Content::from(None::<String>)
            .resolve(&assets())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_resolve_propagates_errors() {
        let content =
            Content::from_async_fn(|_| Box::pin(async { Err::<Content, _>(anyhow::anyhow!("boom")) }));
        let err = content.resolve(&assets()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_debug_hides_functions() {
        let content = Content::from_fn(|_| Content::Skip);
        assert!(content.is_derived());
        assert_eq!(format!("{content:?}"), "Derived(<fn>)");
    }
}
