use async_trait::async_trait;

use crate::error::Result;

/// Page size the market RPC serves at most.
pub const PAGE_SIZE: usize = 1000;

/// Anything that can serve one offset/limit page.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Self::Item>>;
}

/// Walk consecutive pages until one comes back short.
/// Any failed page fails the whole walk.
pub async fn fetch_all_pages<S>(source: &S, page_size: usize) -> Result<Vec<S::Item>>
where
    S: PageSource + ?Sized,
{
    let mut out = Vec::new();
    let mut offset = 0;

    loop {
        let page = source.fetch_page(offset, page_size).await?;
        let full = page.len() == page_size;
        offset += page.len();
        out.extend(page);

        if !full || page_size == 0 {
            break;
        }
    }

    Ok(out)
}
