// This file is part of the terraform-provider-ibm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::future::Future;

use futures::{pin_mut, stream, Stream, TryStreamExt};

use super::{ApiError, ApiResult};

/// One page of a list call, with the cursor of the following page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<String>) -> Self {
        Self {
            items,
            next: next.filter(|cursor| !cursor.is_empty()),
        }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Stream the pages of a list call.
///
/// `fetch` is called with `None` for the first page, then with the cursor
/// returned by the previous page until a page comes back without one.
pub fn pages<T, F, Fut>(fetch: F) -> impl Stream<Item = ApiResult<Vec<T>>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ApiResult<Page<T>>>,
{
    // `None` once the last page has been yielded
    let start: Option<Option<String>> = Some(None);

    stream::try_unfold((fetch, start), |(mut fetch, cursor)| async move {
        let Some(cursor) = cursor else {
            return Ok::<_, ApiError>(None);
        };
        let page = fetch(cursor).await?;
        let next = page.next.filter(|cursor| !cursor.is_empty()).map(Some);
        Ok(Some((page.items, (fetch, next))))
    })
}

/// Fetch every page and concatenate the items, preserving order
pub async fn collect_all<T, F, Fut>(fetch: F) -> ApiResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ApiResult<Page<T>>>,
{
    pages(fetch).try_concat().await
}

/// Scan pages in order and return the first item matching `predicate`.
///
/// Pagination stops on the first match; `None` is only returned once the
/// last page has been scanned.
pub async fn find_first<T, F, Fut, P>(fetch: F, mut predicate: P) -> ApiResult<Option<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ApiResult<Page<T>>>,
    P: FnMut(&T) -> bool,
{
    let pages = pages(fetch);
    pin_mut!(pages);

    while let Some(items) = pages.try_next().await? {
        if let Some(found) = items.into_iter().find(|item| predicate(item)) {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
