use std::collections::VecDeque;

use assessment_core::model::QuestionId;
use dioxus::prelude::*;

use crate::views::ViewError;
use crate::vm::{FlowPanelVm, FlowVm};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowIntent {
    Answer(QuestionId, i64),
    Submit,
}

/// Signals behind the question flow of one page.
///
/// The `FlowVm` leaves its slot while a request is in flight. Input arriving
/// meanwhile waits in the queue and is applied, in order, by the task holding
/// the vm. `panel` keeps the last snapshot on screen the whole time.
#[derive(Clone, Copy)]
pub struct FlowSlots {
    vm: Signal<Option<FlowVm>>,
    panel: Signal<Option<FlowPanelVm>>,
    queue: Signal<VecDeque<FlowIntent>>,
    error: Signal<Option<ViewError>>,
}

pub fn use_flow_slots() -> FlowSlots {
    FlowSlots {
        vm: use_signal(|| None),
        panel: use_signal(|| None),
        queue: use_signal(VecDeque::new),
        error: use_signal(|| None),
    }
}

impl FlowSlots {
    pub fn install(mut self, vm: FlowVm) {
        self.panel.set(Some(vm.panel()));
        self.vm.set(Some(vm));
    }

    #[must_use]
    pub fn panel(&self) -> Option<FlowPanelVm> {
        (self.panel)()
    }

    #[must_use]
    pub fn error(&self) -> Option<ViewError> {
        (self.error)()
    }

    /// A request is in flight or input is still waiting.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        let vm_out = self.vm.read().is_none() && self.panel.read().is_some();
        vm_out || !self.queue.read().is_empty()
    }

    pub fn dispatch(mut self, intent: FlowIntent) {
        {
            let mut queue = self.queue.write();
            if intent == FlowIntent::Submit && queue.contains(&FlowIntent::Submit) {
                return;
            }
            queue.push_back(intent);
        }
        spawn(async move {
            self.drain().await;
        });
    }

    async fn drain(mut self) {
        // Whoever holds the vm applies everything queued so far.
        let taken = self.vm.write().take();
        let Some(mut vm) = taken else {
            return;
        };

        loop {
            let next = self.queue.write().pop_front();
            let Some(intent) = next else {
                break;
            };
            let result = match intent {
                FlowIntent::Answer(id, value) => vm.answer(id, value).await,
                FlowIntent::Submit => vm.submit().await.map(|_| ()),
            };
            self.panel.set(Some(vm.panel()));
            self.error.set(result.err());
        }

        self.vm.set(Some(vm));
    }
}
