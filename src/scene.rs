//! Scenes and the scene stack.
//!
//! A [`Scene`] is one self-contained game state (menu, gameplay, pause
//! overlay). The [`SceneManager`] keeps them on a stack: only the top scene
//! receives input, updates and renders. Scenes request stack changes by
//! returning a [`Transition`]; the manager queues those and applies them
//! strictly between frames, so the stack never changes while a scene is
//! mid-update or mid-render.
//!
//! Pushing a scene runs its async `on_load` first. If loading fails the
//! scene never enters the stack and the error surfaces out of
//! [`SceneManager::apply_pending`] — the engine never runs a half-loaded
//! scene.

use std::{collections::VecDeque, fmt::Debug, pin::Pin};

use anyhow::bail;
use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{camera::Camera, context::Context, render::Render};

/// A game state managed by the [`SceneManager`].
///
/// `S` is the shared application state threaded through every hook.
pub trait Scene<S> {
    /// Acquire every resource the scene needs. The scene only enters the
    /// stack if this returns `Ok`.
    fn on_load<'a>(
        &'a mut self,
        _ctx: &'a mut Context,
        _state: &'a mut S,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>> {
        Box::pin(async { Ok(()) })
    }

    /// Release scene-owned resources. Registries are swept afterwards.
    fn on_unload(&mut self, _ctx: &mut Context, _state: &mut S) {}

    /// Per-frame logic. The returned transition is queued, not applied.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Transition<S>;

    fn on_window_events(
        &mut self,
        _ctx: &Context,
        _state: &mut S,
        _event: &WindowEvent,
    ) -> Transition<S> {
        Transition::None
    }

    fn on_device_events(
        &mut self,
        _ctx: &Context,
        _state: &mut S,
        _event: &DeviceEvent,
    ) -> Transition<S> {
        Transition::None
    }

    /// What to draw this frame.
    fn on_render(&self) -> Render<'_>;

    /// The scene's single active camera, read by the frame loop.
    fn camera(&self) -> &Camera;
    fn camera_mut(&mut self) -> &mut Camera;
}

impl<S> Debug for dyn Scene<S> + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scene")
    }
}

/// A requested change to the scene stack, applied at the next frame boundary.
pub enum Transition<S> {
    /// Stay as is.
    None,
    /// Load the scene and put it on top; the current top is covered, not
    /// unloaded.
    Push(Box<dyn Scene<S>>),
    /// Unload and remove the top scene, revealing the one below.
    Pop,
    /// Swap the top scene for a freshly loaded one.
    Replace(Box<dyn Scene<S>>),
    /// Unload everything and shut the application down.
    Quit,
}

impl<S> Debug for Transition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::None => f.write_str("None"),
            Transition::Push(_) => f.write_str("Push"),
            Transition::Pop => f.write_str("Pop"),
            Transition::Replace(_) => f.write_str("Replace"),
            Transition::Quit => f.write_str("Quit"),
        }
    }
}

/// A stack operation with the scene-agnostic semantics of [`Transition`].
#[derive(Debug, PartialEq)]
pub enum StackOp<T> {
    Push(T),
    Pop,
    Replace(T),
    Clear,
}

/// The bare stack the manager drives.
///
/// Pop and replace on an empty stack are rejected and leave the stack
/// untouched; every removal hands the removed elements back to the caller
/// (top first) so their teardown can run.
#[derive(Debug)]
pub struct SceneStack<T> {
    scenes: Vec<T>,
}

impl<T> SceneStack<T> {
    pub fn new() -> Self {
        Self { scenes: Vec::new() }
    }

    pub fn top(&self) -> Option<&T> {
        self.scenes.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.scenes.last_mut()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Apply one operation, returning the removed elements top-first.
    pub fn apply(&mut self, op: StackOp<T>) -> anyhow::Result<Vec<T>> {
        match op {
            StackOp::Push(scene) => {
                self.scenes.push(scene);
                Ok(Vec::new())
            }
            StackOp::Pop => match self.scenes.pop() {
                Some(scene) => Ok(vec![scene]),
                None => bail!("pop on an empty scene stack"),
            },
            StackOp::Replace(scene) => match self.scenes.pop() {
                Some(old) => {
                    self.scenes.push(scene);
                    Ok(vec![old])
                }
                None => bail!("replace on an empty scene stack"),
            },
            StackOp::Clear => {
                let mut removed: Vec<T> = self.scenes.drain(..).collect();
                removed.reverse();
                Ok(removed)
            }
        }
    }
}

impl<T> Default for SceneStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the scene stack and the queue of transitions waiting for the next
/// frame boundary.
#[derive(Debug)]
pub struct SceneManager<S> {
    stack: SceneStack<Box<dyn Scene<S>>>,
    pending: VecDeque<Transition<S>>,
}

impl<S> SceneManager<S> {
    pub fn new() -> Self {
        Self {
            stack: SceneStack::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn top(&self) -> Option<&dyn Scene<S>> {
        self.stack.top().map(|scene| scene.as_ref())
    }

    pub fn top_mut(&mut self) -> Option<&mut Box<dyn Scene<S>>> {
        self.stack.top_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn pending_transitions(&self) -> usize {
        self.pending.len()
    }

    /// Queue a transition for the next frame boundary. The stack itself is
    /// untouched until [`apply_pending`](Self::apply_pending) runs.
    pub fn defer(&mut self, transition: Transition<S>) {
        if !matches!(transition, Transition::None) {
            log::debug!("deferring scene transition {transition:?}");
            self.pending.push_back(transition);
        }
    }

    /// Let the top scene handle a frame update; its requested transition is
    /// queued.
    pub fn update(&mut self, ctx: &Context, state: &mut S, dt: Duration) {
        if let Some(scene) = self.stack.top_mut() {
            let transition = scene.on_update(ctx, state, dt);
            self.defer(transition);
        }
    }

    pub fn handle_window_event(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) {
        if let Some(scene) = self.stack.top_mut() {
            let transition = scene.on_window_events(ctx, state, event);
            self.defer(transition);
        }
    }

    pub fn handle_device_event(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) {
        if let Some(scene) = self.stack.top_mut() {
            let transition = scene.on_device_events(ctx, state, event);
            self.defer(transition);
        }
    }

    /// Apply all queued transitions in FIFO order. Call between frames only.
    ///
    /// A rejected transition (failed `on_load`, pop/replace on empty) returns
    /// its error and drops the rest of the queue; already-applied transitions
    /// stay applied. Removed scenes are unloaded and the asset registries
    /// swept.
    pub fn apply_pending(
        &mut self,
        rt: &tokio::runtime::Runtime,
        ctx: &mut Context,
        state: &mut S,
    ) -> anyhow::Result<()> {
        let mut removed = Vec::new();
        let result = self.apply_queued(
            &mut |scene| rt.block_on(scene.on_load(ctx, state)),
            &mut removed,
        );
        for scene in &mut removed {
            scene.on_unload(ctx, state);
        }
        // sweep on failure too: whatever a failed on_load parked in the
        // registries has no scene holding it
        if !removed.is_empty() || result.is_err() {
            ctx.assets.sweep();
        }
        result
    }

    /// Queue-draining core of [`apply_pending`](Self::apply_pending), with
    /// the loading step injected. A failed load (or an invalid operation)
    /// stops the drain and discards the rest of the queue; transitions
    /// already applied stay applied.
    fn apply_queued(
        &mut self,
        load: &mut dyn FnMut(&mut Box<dyn Scene<S>>) -> anyhow::Result<()>,
        removed: &mut Vec<Box<dyn Scene<S>>>,
    ) -> anyhow::Result<()> {
        let result = self.drain_queue(load, removed);
        if result.is_err() {
            self.pending.clear();
        }
        result
    }

    fn drain_queue(
        &mut self,
        load: &mut dyn FnMut(&mut Box<dyn Scene<S>>) -> anyhow::Result<()>,
        removed: &mut Vec<Box<dyn Scene<S>>>,
    ) -> anyhow::Result<()> {
        while let Some(transition) = self.pending.pop_front() {
            let op = match transition {
                Transition::None => continue,
                Transition::Push(mut scene) => {
                    load(&mut scene)?;
                    StackOp::Push(scene)
                }
                Transition::Pop => StackOp::Pop,
                Transition::Replace(mut scene) => {
                    if self.stack.is_empty() {
                        bail!("replace on an empty scene stack");
                    }
                    load(&mut scene)?;
                    StackOp::Replace(scene)
                }
                Transition::Quit => StackOp::Clear,
            };
            removed.append(&mut self.stack.apply(op)?);
        }
        Ok(())
    }
}

impl<S> Default for SceneManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, FirstPersonCamera};

    struct Dummy {
        camera: Camera,
    }

    impl Dummy {
        fn boxed() -> Box<dyn Scene<()>> {
            Box::new(Dummy {
                camera: Camera::FirstPerson(FirstPersonCamera::default()),
            })
        }
    }

    impl Scene<()> for Dummy {
        fn on_update(&mut self, _ctx: &Context, _state: &mut (), _dt: Duration) -> Transition<()> {
            Transition::None
        }

        fn on_render(&self) -> Render<'_> {
            Render::None
        }

        fn camera(&self) -> &Camera {
            &self.camera
        }

        fn camera_mut(&mut self) -> &mut Camera {
            &mut self.camera
        }
    }

    #[test]
    fn push_then_pop_restores_previous_top() {
        let mut stack: SceneStack<&str> = SceneStack::new();
        stack.apply(StackOp::Push("menu")).unwrap();
        stack.apply(StackOp::Push("play")).unwrap();
        assert_eq!(stack.top(), Some(&"play"));

        let removed = stack.apply(StackOp::Pop).unwrap();
        assert_eq!(removed, vec!["play"]);
        assert_eq!(stack.top(), Some(&"menu"));
    }

    #[test]
    fn replace_swaps_the_top_only() {
        let mut stack: SceneStack<&str> = SceneStack::new();
        stack.apply(StackOp::Push("menu")).unwrap();
        stack.apply(StackOp::Push("play")).unwrap();

        let removed = stack.apply(StackOp::Replace("pause")).unwrap();
        assert_eq!(removed, vec!["play"]);
        assert_eq!(stack.top(), Some(&"pause"));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn pop_and_replace_on_empty_are_rejected() {
        let mut stack: SceneStack<&str> = SceneStack::new();
        assert!(stack.apply(StackOp::Pop).is_err());
        assert!(stack.apply(StackOp::Replace("menu")).is_err());
        assert!(stack.is_empty());
    }

    #[test]
    fn clear_removes_top_first() {
        let mut stack: SceneStack<&str> = SceneStack::new();
        stack.apply(StackOp::Push("menu")).unwrap();
        stack.apply(StackOp::Push("play")).unwrap();

        let removed = stack.apply(StackOp::Clear).unwrap();
        assert_eq!(removed, vec!["play", "menu"]);
        assert!(stack.is_empty());
    }

    #[test]
    fn deferred_transitions_leave_the_stack_untouched() {
        let mut manager: SceneManager<()> = SceneManager::new();
        manager.defer(Transition::Push(Dummy::boxed()));
        manager.defer(Transition::Pop);

        assert!(manager.is_empty());
        assert!(manager.top().is_none());
        assert_eq!(manager.pending_transitions(), 2);
    }

    #[test]
    fn queued_transitions_apply_in_fifo_order() {
        let mut manager: SceneManager<()> = SceneManager::new();
        manager.defer(Transition::Push(Dummy::boxed()));
        manager.defer(Transition::Push(Dummy::boxed()));
        manager.defer(Transition::Pop);

        let mut removed = Vec::new();
        manager.apply_queued(&mut |_| Ok(()), &mut removed).unwrap();

        // push, push, pop leaves exactly the first scene
        assert_eq!(manager.len(), 1);
        assert_eq!(removed.len(), 1);
        assert_eq!(manager.pending_transitions(), 0);
    }

    #[test]
    fn failed_load_rejects_the_scene_and_drops_the_queue() {
        let mut manager: SceneManager<()> = SceneManager::new();
        manager.defer(Transition::Push(Dummy::boxed()));
        manager.defer(Transition::Push(Dummy::boxed()));
        manager.defer(Transition::Pop);

        let mut loads = 0;
        let mut removed = Vec::new();
        let result = manager.apply_queued(
            &mut |_| {
                loads += 1;
                if loads == 2 {
                    bail!("asset missing");
                }
                Ok(())
            },
            &mut removed,
        );

        assert!(result.is_err());
        // the first push survived, the failing scene never entered the
        // stack and the pop behind it was discarded
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.pending_transitions(), 0);
        assert!(removed.is_empty());
    }

    #[test]
    fn replace_on_empty_is_rejected_before_loading() {
        let mut manager: SceneManager<()> = SceneManager::new();
        manager.defer(Transition::Replace(Dummy::boxed()));

        let mut loads = 0;
        let mut removed = Vec::new();
        let result = manager.apply_queued(
            &mut |_| {
                loads += 1;
                Ok(())
            },
            &mut removed,
        );

        assert!(result.is_err());
        assert_eq!(loads, 0, "a rejected replace must not load the scene");
        assert!(manager.is_empty());
    }

    #[test]
    fn none_transitions_are_not_queued() {
        let mut manager: SceneManager<()> = SceneManager::new();
        manager.defer(Transition::None);
        assert_eq!(manager.pending_transitions(), 0);
    }
}
