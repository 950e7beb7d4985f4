//! Drag-reorder interaction.
//!
//! A gesture arrives as an explicit stream of [`DragEvent`]s. The controller
//! keeps the visual order and turns crossings into [`ReorderRequest`]s for the
//! affected sibling set; [`run_drag_session`] feeds them to a [`ReorderSink`]
//! one at a time.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    dto::reorder::{ReorderCategoriesRequest, ReorderDishesRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    ordering::{Placement, move_item},
    scope::Scope,
    services::{category_service, dish_service},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Start(Uuid),
    Over(Uuid),
    End,
}

/// When the controller asks for the new order to be persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistPolicy {
    /// On every crossing of a new target.
    Live,
    /// Once, when the gesture ends with a changed order.
    #[default]
    OnDrop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragItem {
    pub id: Uuid,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub scope: Scope,
    pub ordered_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging {
        source: Uuid,
        scope: Scope,
        moved: bool,
    },
}

#[derive(Debug)]
pub struct DragController {
    items: Vec<DragItem>,
    policy: PersistPolicy,
    state: DragState,
}

impl DragController {
    pub fn new(items: Vec<DragItem>, policy: PersistPolicy) -> Self {
        Self {
            items,
            policy,
            state: DragState::Idle,
        }
    }

    /// Current visual order, all scopes interleaved as rendered.
    pub fn items(&self) -> &[DragItem] {
        &self.items
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Replace the rendered list, e.g. after a refetch. A drag whose source
    /// disappeared is abandoned.
    pub fn sync(&mut self, items: Vec<DragItem>) {
        self.items = items;
        if let DragState::Dragging { source, .. } = self.state {
            if !self.items.iter().any(|item| item.id == source) {
                self.state = DragState::Idle;
            }
        }
    }

    pub fn handle(&mut self, event: DragEvent) -> Option<ReorderRequest> {
        match event {
            DragEvent::Start(id) => {
                self.state = match self.scope_of(id) {
                    Some(scope) => DragState::Dragging {
                        source: id,
                        scope,
                        moved: false,
                    },
                    None => DragState::Idle,
                };
                None
            }
            DragEvent::Over(target) => self.drag_over(target),
            DragEvent::End => {
                let state = std::mem::replace(&mut self.state, DragState::Idle);
                match (state, self.policy) {
                    (
                        DragState::Dragging {
                            scope, moved: true, ..
                        },
                        PersistPolicy::OnDrop,
                    ) => Some(self.request_for(scope)),
                    _ => None,
                }
            }
        }
    }

    fn drag_over(&mut self, target: Uuid) -> Option<ReorderRequest> {
        let DragState::Dragging { source, scope, .. } = self.state else {
            return None;
        };
        if target == source || self.scope_of(target) != Some(scope) {
            return None;
        }

        let siblings = self.sibling_ids(scope);
        let source_idx = siblings.iter().position(|id| *id == source)?;
        let target_idx = siblings.iter().position(|id| *id == target)?;
        let placement = if source_idx < target_idx {
            Placement::After
        } else {
            Placement::Before
        };
        let ordered = move_item(&siblings, source, target, placement).ok()?;

        // write the new sibling order back into the slots this scope occupies
        let mut reordered = ordered.into_iter();
        for item in self.items.iter_mut().filter(|item| item.scope == scope) {
            if let Some(id) = reordered.next() {
                item.id = id;
            }
        }

        self.state = DragState::Dragging {
            source,
            scope,
            moved: true,
        };
        match self.policy {
            PersistPolicy::Live => Some(self.request_for(scope)),
            PersistPolicy::OnDrop => None,
        }
    }

    fn scope_of(&self, id: Uuid) -> Option<Scope> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.scope)
    }

    fn sibling_ids(&self, scope: Scope) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|item| item.scope == scope)
            .map(|item| item.id)
            .collect()
    }

    fn request_for(&self, scope: Scope) -> ReorderRequest {
        ReorderRequest {
            scope,
            ordered_ids: self.sibling_ids(scope),
        }
    }
}

/// Where reorder requests go once the controller emits them.
pub trait ReorderSink {
    fn submit(&self, request: ReorderRequest) -> impl Future<Output = AppResult<()>> + Send;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragSessionReport {
    pub submitted: usize,
    pub failed: usize,
    /// Requests replaced by a later one for the same scope before submission.
    pub superseded: usize,
}

/// Drive `controller` with `events` until the sender side is dropped.
///
/// Requests are submitted sequentially. Whatever queued up while a submission
/// was in flight is folded so only the newest request per scope goes out.
pub async fn run_drag_session<S>(
    controller: &mut DragController,
    mut events: mpsc::Receiver<DragEvent>,
    sink: &S,
) -> DragSessionReport
where
    S: ReorderSink,
{
    let mut report = DragSessionReport::default();

    while let Some(event) = events.recv().await {
        let mut pending: Vec<ReorderRequest> = controller.handle(event).into_iter().collect();
        while let Ok(event) = events.try_recv() {
            let Some(request) = controller.handle(event) else {
                continue;
            };
            match pending.iter_mut().find(|queued| queued.scope == request.scope) {
                Some(queued) => {
                    *queued = request;
                    report.superseded += 1;
                }
                None => pending.push(request),
            }
        }

        for request in pending {
            let scope = request.scope;
            match sink.submit(request).await {
                Ok(()) => report.submitted += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(?scope, error = %err, "reorder request failed");
                }
            }
        }
    }

    tracing::debug!(
        submitted = report.submitted,
        failed = report.failed,
        superseded = report.superseded,
        "drag session finished"
    );
    report
}

/// Persists drag results through the collection services as `user`.
#[derive(Clone)]
pub struct AdminReorderSink {
    pub state: AppState,
    pub user: AuthUser,
}

impl AdminReorderSink {
    pub fn new(state: AppState, user: AuthUser) -> Self {
        Self { state, user }
    }
}

impl ReorderSink for AdminReorderSink {
    async fn submit(&self, request: ReorderRequest) -> AppResult<()> {
        match request.scope {
            Scope::Restaurant(restaurant_id) => {
                let payload = ReorderCategoriesRequest {
                    restaurant_id: Some(restaurant_id),
                    ordered_ids: request.ordered_ids,
                };
                category_service::reorder_categories(&self.state, &self.user, payload).await?;
            }
            Scope::Category(category_id) => {
                let payload = ReorderDishesRequest {
                    category_id,
                    ordered_ids: request.ordered_ids,
                };
                dish_service::reorder_dishes(&self.state, &self.user, payload).await?;
            }
            Scope::Menu(_) => {
                return Err(AppError::BadRequest(
                    "dishes can only be reordered within a category".into(),
                ));
            }
        }
        Ok(())
    }
}
