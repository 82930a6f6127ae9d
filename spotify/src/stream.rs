use crate::model::Page;
use futures::stream::Stream;
use futures::Future;

/// Requests consecutive `(limit, offset)` pages until `offset >= total`.
pub fn paginate<'a, T: 'a, E: 'a, Fut, Req: 'a>(
    req: Req,
    page_size: u32,
) -> impl Stream<Item = Result<T, E>> + 'a + Send
where
    T: Unpin + Send,
    E: Send,
    Fut: Future<Output = Result<Page<T>, E>> + Send,
    Req: Fn(u32, u32) -> Fut + Send + Sync,
{
    let mut offset = 0;
    Box::pin(async_stream::try_stream! {
        loop {
            let page = req(page_size, offset).await?;
            let received = page.items.len();
            offset += page_size;
            for item in page.items {
                yield item;
            }
            if received == 0 || offset >= page.total {
                break;
            }
        }
    })
}
