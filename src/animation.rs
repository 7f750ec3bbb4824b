use crate::geometry::{ease_in_out, Geometry, Rect};
use crate::model::Note;
use std::time::{Duration, Instant};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(350);

/// Max distance, in cells, between the overlay and its expected resting place for a
/// completion signal to be accepted.
pub const SETTLE_TOLERANCE: f32 = 2.0;

/// Extra frames granted to the dialog to become measurable.
const MEASURE_GRACE_FRAMES: u8 = 1;

/// Fraction of the collapse, counted from the end, during which the overlay fades out.
const FADE_PORTION: f32 = 1.0 / 3.0;

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationState {
    Idle,
    /// Dialog is mounted but hidden; waiting for its rectangle.
    PreparingToExpand {
        note: Note,
        initial: Rect,
        frames_waited: u8,
    },
    Expanding {
        note: Note,
        initial: Rect,
        target: Rect,
        epoch: u64,
        started: Instant,
    },
    /// `geometry` is `None` when the dialog was opened without the expand animation.
    DialogOpen {
        note: Note,
        geometry: Option<(Rect, Rect)>,
    },
    Collapsing {
        note: Note,
        initial: Rect,
        target: Rect,
        epoch: u64,
        started: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PreparingToExpand,
    Expanding,
    DialogOpen,
    Collapsing,
}

/// What the renderer should draw for the overlay this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub rect: Rect,
    pub opacity: f32,
    pub interactive: bool,
}

pub struct Overlay<'a> {
    pub note: &'a Note,
    pub frame: OverlayFrame,
}

/// Report that a geometry transition has come to rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSignal {
    pub epoch: u64,
    pub observed: Rect,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginOutcome {
    Started,
    /// A collapse in flight was settled first.
    Restarted,
    /// Another animation owns the overlay; nothing changed.
    Rejected,
}

/// Card-to-dialog animation state machine.
///
/// Editing a note grows its card into the editing dialog and shrinks it back when the
/// dialog closes. An overlay copy of the card is drawn between the two rectangles while
/// the real card is hidden in the grid and the real dialog is kept invisible.
///
/// ```text
/// Idle --begin--> PreparingToExpand --on_frame (dialog measured)--> Expanding
///                        |                                            |
///                        +--on_frame (still unmeasured)--+            | tick / complete
///                                                        v            v
///                                      DialogOpen { geometry: None }  DialogOpen { Some }
///                                                                     |
///                                                   begin_collapse    v
/// Idle <--tick / complete-- Collapsing <------------------------------+
/// ```
///
/// Time is passed in by the caller and rectangles come from a [`Geometry`] provider,
/// so the machine never touches the terminal itself.
pub struct Animator {
    state: AnimationState,
    duration: Duration,
    next_epoch: u64,
    frame: Option<OverlayFrame>,
}

impl AnimationState {
    pub fn phase(&self) -> Phase {
        match self {
            AnimationState::Idle => Phase::Idle,
            AnimationState::PreparingToExpand { .. } => Phase::PreparingToExpand,
            AnimationState::Expanding { .. } => Phase::Expanding,
            AnimationState::DialogOpen { .. } => Phase::DialogOpen,
            AnimationState::Collapsing { .. } => Phase::Collapsing,
        }
    }

    pub fn note(&self) -> Option<&Note> {
        match self {
            AnimationState::Idle => None,
            AnimationState::PreparingToExpand { note, .. }
            | AnimationState::Expanding { note, .. }
            | AnimationState::DialogOpen { note, .. }
            | AnimationState::Collapsing { note, .. } => Some(note),
        }
    }
}

impl Animator {
    pub fn new(duration: Duration) -> Self {
        Animator {
            state: AnimationState::Idle,
            duration,
            next_epoch: 0,
            frame: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Starts the expand for `note`, whose card currently sits at `card`.
    ///
    /// A collapse still running is settled on the spot so the new card can animate;
    /// any other animation in flight keeps the overlay and the request is rejected.
    pub fn begin(&mut self, note: Note, card: Rect) -> BeginOutcome {
        let outcome = match self.phase() {
            Phase::Idle => BeginOutcome::Started,
            Phase::Collapsing => {
                tracing::debug!("settling collapse to start a new expand");
                self.reset();
                BeginOutcome::Restarted
            }
            phase => {
                tracing::debug!(?phase, id = %note.id, "expand rejected, animation in flight");
                return BeginOutcome::Rejected;
            }
        };
        tracing::debug!(id = %note.id, ?card, "preparing to expand");
        self.state = AnimationState::PreparingToExpand {
            note,
            initial: card,
            frames_waited: 0,
        };
        self.frame = None;
        outcome
    }

    /// Called after each draw pass. Picks up the mounted dialog's rectangle, or gives up
    /// on the animation once the grace frames are spent.
    pub fn on_frame(&mut self, geometry: &dyn Geometry, now: Instant) {
        let AnimationState::PreparingToExpand { frames_waited, .. } = &mut self.state else {
            return;
        };
        let measured = geometry.dialog_rect();
        if measured.is_none() && *frames_waited < MEASURE_GRACE_FRAMES {
            *frames_waited += 1;
            return;
        }
        let AnimationState::PreparingToExpand { note, initial, .. } =
            std::mem::replace(&mut self.state, AnimationState::Idle)
        else {
            return;
        };
        match measured {
            Some(target) => {
                let epoch = self.bump_epoch();
                tracing::debug!(id = %note.id, ?initial, ?target, epoch, "expanding");
                self.frame = Some(OverlayFrame {
                    rect: initial,
                    opacity: 1.0,
                    interactive: true,
                });
                self.state = AnimationState::Expanding {
                    note,
                    initial,
                    target,
                    epoch,
                    started: now,
                };
            }
            None => {
                tracing::debug!(id = %note.id, "dialog not measurable, opening without animation");
                self.frame = None;
                self.state = AnimationState::DialogOpen {
                    note,
                    geometry: None,
                };
            }
        }
    }

    /// Advances the overlay. Once the duration has elapsed the resulting frame is
    /// reported through [`Animator::complete`]. Returns true when the phase changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let (from, to, epoch, started, collapsing) = match &self.state {
            AnimationState::Expanding {
                initial,
                target,
                epoch,
                started,
                ..
            } => (*initial, *target, *epoch, *started, false),
            AnimationState::Collapsing {
                initial,
                target,
                epoch,
                started,
                ..
            } => (*target, *initial, *epoch, *started, true),
            _ => return false,
        };
        let elapsed = now.saturating_duration_since(started);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        let frame = OverlayFrame {
            rect: from.lerp(&to, ease_in_out(progress)),
            opacity: if collapsing {
                collapse_opacity(progress)
            } else {
                1.0
            },
            interactive: true,
        };
        self.frame = Some(frame);
        if elapsed < self.duration {
            return false;
        }
        self.complete(CompletionSignal {
            epoch,
            observed: frame.rect,
            opacity: frame.opacity,
        })
    }

    /// Accepts a completion signal only when it belongs to the running transition and
    /// the overlay actually rests where that transition was heading.
    pub fn complete(&mut self, signal: CompletionSignal) -> bool {
        match &self.state {
            AnimationState::Expanding { target, epoch, .. }
                if signal.epoch == *epoch
                    && signal.observed.approx_eq(target, SETTLE_TOLERANCE) => {}
            AnimationState::Collapsing { initial, epoch, .. }
                if signal.epoch == *epoch
                    && signal.observed.approx_eq(initial, SETTLE_TOLERANCE)
                    && signal.opacity <= 0.01 => {}
            _ => {
                tracing::trace!(?signal, phase = ?self.phase(), "ignoring completion signal");
                return false;
            }
        }
        match std::mem::replace(&mut self.state, AnimationState::Idle) {
            AnimationState::Expanding {
                note,
                initial,
                target,
                ..
            } => {
                tracing::debug!(id = %note.id, "expand finished, dialog open");
                self.frame = Some(OverlayFrame {
                    rect: target,
                    opacity: 0.0,
                    interactive: false,
                });
                self.state = AnimationState::DialogOpen {
                    note,
                    geometry: Some((initial, target)),
                };
            }
            AnimationState::Collapsing { note, .. } => {
                tracing::debug!(id = %note.id, "collapse finished");
                self.frame = None;
            }
            other => self.state = other,
        }
        true
    }

    /// Hides the dialog and shrinks the overlay back onto the card. `latest` is the
    /// freshly persisted note so the overlay shows saved content. Returns false when the
    /// dialog was open without geometry, in which case the machine goes straight to idle.
    pub fn begin_collapse(&mut self, latest: Option<Note>, now: Instant) -> bool {
        if self.phase() != Phase::DialogOpen {
            return false;
        }
        let AnimationState::DialogOpen { note, geometry } =
            std::mem::replace(&mut self.state, AnimationState::Idle)
        else {
            return false;
        };
        let Some((initial, target)) = geometry else {
            tracing::debug!(id = %note.id, "closing dialog without animation");
            self.frame = None;
            return false;
        };
        let note = match latest {
            Some(fresh) if fresh.id == note.id => fresh,
            _ => note,
        };
        let epoch = self.bump_epoch();
        tracing::debug!(id = %note.id, epoch, "collapsing");
        self.frame = Some(OverlayFrame {
            rect: target,
            opacity: 1.0,
            interactive: true,
        });
        self.state = AnimationState::Collapsing {
            note,
            initial,
            target,
            epoch,
            started: now,
        };
        true
    }

    /// Drops whatever is running; used when the dialog opens without a card to grow from.
    pub fn open_direct(&mut self) {
        if self.phase() != Phase::Idle {
            tracing::debug!(phase = ?self.phase(), "animation cancelled by direct open");
        }
        self.reset();
    }

    pub fn overlay(&self) -> Option<Overlay<'_>> {
        let frame = self.frame?;
        match &self.state {
            AnimationState::Expanding { note, .. }
            | AnimationState::DialogOpen { note, .. }
            | AnimationState::Collapsing { note, .. } => Some(Overlay { note, frame }),
            _ => None,
        }
    }

    pub fn editing_note(&self) -> Option<&Note> {
        self.state.note()
    }

    pub fn hides_card(&self, id: &str) -> bool {
        self.state.note().map(|n| n.id == id).unwrap_or(false)
    }

    /// The dialog exists in the layout, visible or not.
    pub fn dialog_mounted(&self) -> bool {
        matches!(
            self.phase(),
            Phase::PreparingToExpand | Phase::Expanding | Phase::DialogOpen
        )
    }

    pub fn dialog_visible(&self) -> bool {
        self.phase() == Phase::DialogOpen
    }

    /// Something is moving and needs a fast frame rate.
    pub fn animating(&self) -> bool {
        matches!(
            self.phase(),
            Phase::PreparingToExpand | Phase::Expanding | Phase::Collapsing
        )
    }

    fn reset(&mut self) {
        self.state = AnimationState::Idle;
        self.frame = None;
    }

    fn bump_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }
}

fn collapse_opacity(progress: f32) -> f32 {
    let fade_start = 1.0 - FADE_PORTION;
    if progress <= fade_start {
        1.0
    } else {
        (1.0 - (progress - fade_start) / FADE_PORTION).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteDraft;
    use proptest::prelude::*;

    const CARD: Rect = Rect::new(100.0, 50.0, 300.0, 200.0);
    const DIALOG: Rect = Rect::new(80.0, 200.0, 600.0, 500.0);

    struct FakeGeometry {
        dialog: Option<Rect>,
    }

    impl Geometry for FakeGeometry {
        fn card_rect(&self, _id: &str) -> Option<Rect> {
            Some(CARD)
        }

        fn dialog_rect(&self) -> Option<Rect> {
            self.dialog
        }
    }

    fn note(title: &str) -> Note {
        Note::new(NoteDraft::new(title, "", None).unwrap())
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn measured() -> FakeGeometry {
        FakeGeometry {
            dialog: Some(DIALOG),
        }
    }

    /// Drives `animator` from idle to an open dialog, returning the instant it opened.
    fn open(animator: &mut Animator, n: Note, t0: Instant) -> Instant {
        assert_eq!(animator.begin(n, CARD), BeginOutcome::Started);
        animator.on_frame(&measured(), t0);
        let done = ms(t0, 350);
        assert!(animator.tick(done));
        assert_eq!(animator.phase(), Phase::DialogOpen);
        done
    }

    #[test]
    fn edit_cycle_expands_then_collapses_back_to_idle() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        let draft = note("Draft");
        let mut phases = vec![animator.phase()];

        animator.begin(draft.clone(), CARD);
        phases.push(animator.phase());
        assert!(animator.dialog_mounted());
        assert!(!animator.dialog_visible());
        assert!(animator.hides_card(&draft.id));

        animator.on_frame(&measured(), t0);
        phases.push(animator.phase());
        match animator.state() {
            AnimationState::Expanding {
                initial, target, ..
            } => {
                assert_eq!(*initial, CARD);
                assert_eq!(*target, DIALOG);
            }
            other => panic!("expected expanding, got {:?}", other),
        }

        assert!(!animator.tick(ms(t0, 175)));
        let mid = animator.overlay().unwrap().frame;
        assert!(mid.rect.approx_eq(&CARD.lerp(&DIALOG, 0.5), 0.01));
        assert_eq!(mid.opacity, 1.0);

        assert!(animator.tick(ms(t0, 350)));
        phases.push(animator.phase());
        assert!(animator.dialog_visible());
        let hidden = animator.overlay().unwrap().frame;
        assert_eq!(hidden.opacity, 0.0);
        assert!(!hidden.interactive);

        let mut saved = draft.clone();
        saved.title = "Final".into();
        saved.updated_at += 1;
        let t1 = ms(t0, 5_000);
        assert!(animator.begin_collapse(Some(saved.clone()), t1));
        phases.push(animator.phase());
        assert!(!animator.dialog_visible());
        let overlay = animator.overlay().unwrap();
        assert_eq!(overlay.note.title, "Final");
        assert_eq!(overlay.frame.rect, DIALOG);
        assert_eq!(overlay.frame.opacity, 1.0);

        assert!(animator.tick(ms(t1, 350)));
        phases.push(animator.phase());
        assert_eq!(animator.state(), &AnimationState::Idle);
        assert!(animator.overlay().is_none());
        assert!(animator.editing_note().is_none());
        assert!(!animator.hides_card(&draft.id));

        assert_eq!(
            phases,
            [
                Phase::Idle,
                Phase::PreparingToExpand,
                Phase::Expanding,
                Phase::DialogOpen,
                Phase::Collapsing,
                Phase::Idle,
            ]
        );
    }

    #[test]
    fn overlay_stays_opaque_until_the_last_third_of_collapse() {
        let t0 = Instant::now();
        let mut animator = Animator::new(Duration::from_millis(300));
        animator.begin(note("Fade"), CARD);
        animator.on_frame(&measured(), t0);
        for step in [0, 50, 100, 150, 250] {
            animator.tick(ms(t0, step));
            assert_eq!(animator.overlay().unwrap().frame.opacity, 1.0);
        }
        animator.tick(ms(t0, 300));
        let t1 = ms(t0, 1_000);
        animator.begin_collapse(None, t1);

        animator.tick(ms(t1, 150));
        assert_eq!(animator.overlay().unwrap().frame.opacity, 1.0);
        animator.tick(ms(t1, 250));
        let fading = animator.overlay().unwrap().frame.opacity;
        assert!(fading > 0.0 && fading < 1.0);
        assert!(animator.tick(ms(t1, 300)));
        assert_eq!(animator.phase(), Phase::Idle);
    }

    #[test]
    fn unmeasurable_dialog_opens_without_animation_after_one_frame() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        let n = note("No dialog yet");
        animator.begin(n.clone(), CARD);
        let missing = FakeGeometry { dialog: None };

        animator.on_frame(&missing, t0);
        assert_eq!(animator.phase(), Phase::PreparingToExpand);
        animator.on_frame(&missing, ms(t0, 16));
        assert_eq!(
            animator.state(),
            &AnimationState::DialogOpen {
                note: n,
                geometry: None
            }
        );
        assert!(animator.overlay().is_none());

        assert!(!animator.begin_collapse(None, ms(t0, 100)));
        assert_eq!(animator.state(), &AnimationState::Idle);
    }

    #[test]
    fn dialog_measured_on_second_frame_still_animates() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        animator.begin(note("Late"), CARD);
        animator.on_frame(&FakeGeometry { dialog: None }, t0);
        animator.on_frame(&measured(), ms(t0, 16));
        assert_eq!(animator.phase(), Phase::Expanding);
    }

    #[test]
    fn spurious_and_stale_signals_are_ignored() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        animator.begin(note("Guarded"), CARD);
        animator.on_frame(&measured(), t0);
        let epoch = match animator.state() {
            AnimationState::Expanding { epoch, .. } => *epoch,
            _ => unreachable!(),
        };

        // Right epoch, overlay still halfway.
        assert!(!animator.complete(CompletionSignal {
            epoch,
            observed: CARD.lerp(&DIALOG, 0.5),
            opacity: 1.0,
        }));
        // Wrong epoch, correct geometry.
        assert!(!animator.complete(CompletionSignal {
            epoch: epoch + 7,
            observed: DIALOG,
            opacity: 1.0,
        }));
        assert_eq!(animator.phase(), Phase::Expanding);

        // Within tolerance is good enough.
        let near = Rect::new(DIALOG.top + 1.5, DIALOG.left - 1.0, DIALOG.width, DIALOG.height);
        assert!(animator.complete(CompletionSignal {
            epoch,
            observed: near,
            opacity: 1.0,
        }));
        assert_eq!(animator.phase(), Phase::DialogOpen);

        // The finished expand's signal cannot end the collapse.
        animator.begin_collapse(None, ms(t0, 1_000));
        assert!(!animator.complete(CompletionSignal {
            epoch,
            observed: CARD,
            opacity: 0.0,
        }));
        assert_eq!(animator.phase(), Phase::Collapsing);
    }

    #[test]
    fn collapse_needs_faded_overlay() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        let opened = open(&mut animator, note("Opaque"), t0);
        animator.begin_collapse(None, opened);
        let epoch = match animator.state() {
            AnimationState::Collapsing { epoch, .. } => *epoch,
            _ => unreachable!(),
        };
        assert!(!animator.complete(CompletionSignal {
            epoch,
            observed: CARD,
            opacity: 0.5,
        }));
        assert!(animator.complete(CompletionSignal {
            epoch,
            observed: CARD,
            opacity: 0.0,
        }));
        assert_eq!(animator.state(), &AnimationState::Idle);
    }

    #[test]
    fn collapse_uses_held_note_when_store_has_none() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        let held = note("Held");
        let opened = open(&mut animator, held.clone(), t0);
        let stranger = note("Other note");
        animator.begin_collapse(Some(stranger), opened);
        assert_eq!(animator.editing_note(), Some(&held));
    }

    #[test]
    fn second_edit_is_rejected_while_expanding_or_open() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        let first = note("First");
        animator.begin(first.clone(), CARD);
        assert_eq!(animator.begin(note("Second"), CARD), BeginOutcome::Rejected);
        animator.on_frame(&measured(), t0);
        assert_eq!(animator.begin(note("Second"), CARD), BeginOutcome::Rejected);
        animator.tick(ms(t0, 350));
        assert_eq!(animator.begin(note("Second"), CARD), BeginOutcome::Rejected);
        assert_eq!(animator.editing_note(), Some(&first));
    }

    #[test]
    fn second_edit_during_collapse_settles_and_restarts() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        let first = note("First");
        let opened = open(&mut animator, first.clone(), t0);
        animator.begin_collapse(None, opened);
        animator.tick(ms(opened, 100));

        let second = note("Second");
        assert_eq!(
            animator.begin(second.clone(), CARD),
            BeginOutcome::Restarted
        );
        assert!(!animator.hides_card(&first.id));
        assert!(animator.hides_card(&second.id));
        assert_eq!(animator.phase(), Phase::PreparingToExpand);
        assert!(animator.overlay().is_none());

        // The abandoned collapse's timer firing later has no effect.
        assert!(!animator.tick(ms(opened, 400)));
        assert_eq!(animator.phase(), Phase::PreparingToExpand);
    }

    #[test]
    fn direct_open_resets_from_any_phase() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);

        animator.begin(note("a"), CARD);
        animator.open_direct();
        assert_eq!(animator.state(), &AnimationState::Idle);

        animator.begin(note("b"), CARD);
        animator.on_frame(&measured(), t0);
        animator.open_direct();
        assert_eq!(animator.state(), &AnimationState::Idle);
        assert!(animator.overlay().is_none());

        let opened = open(&mut animator, note("c"), t0);
        animator.begin_collapse(None, opened);
        animator.open_direct();
        assert_eq!(animator.state(), &AnimationState::Idle);
    }

    #[test]
    fn idle_ignores_ticks_frames_and_collapse() {
        let t0 = Instant::now();
        let mut animator = Animator::new(DEFAULT_DURATION);
        assert!(!animator.tick(t0));
        animator.on_frame(&measured(), t0);
        assert!(!animator.begin_collapse(None, t0));
        assert_eq!(animator.state(), &AnimationState::Idle);
        assert!(!animator.animating());
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let t0 = Instant::now();
        let mut animator = Animator::new(Duration::ZERO);
        animator.begin(note("Instant"), CARD);
        animator.on_frame(&measured(), t0);
        assert!(animator.tick(t0));
        assert_eq!(animator.phase(), Phase::DialogOpen);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Begin,
        Frame { measurable: bool },
        Tick(u64),
        Collapse,
        OpenDirect,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Begin),
            any::<bool>().prop_map(|measurable| Step::Frame { measurable }),
            (0u64..500).prop_map(Step::Tick),
            Just(Step::Collapse),
            Just(Step::OpenDirect),
        ]
    }

    fn assert_clean_idle(animator: &Animator) {
        assert_eq!(animator.state(), &AnimationState::Idle);
        assert!(animator.overlay().is_none());
        assert!(animator.editing_note().is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn any_event_order_keeps_transitions_legal(
            steps in prop::collection::vec(step_strategy(), 0..40),
        ) {
            let mut now = Instant::now();
            let mut animator = Animator::new(DEFAULT_DURATION);
            for step in steps {
                let before = animator.state().clone();
                match step {
                    Step::Begin => {
                        animator.begin(note("n"), CARD);
                    }
                    Step::Frame { measurable } => {
                        let geometry = FakeGeometry {
                            dialog: measurable.then_some(DIALOG),
                        };
                        animator.on_frame(&geometry, now);
                    }
                    Step::Tick(millis) => {
                        now = ms(now, millis);
                        animator.tick(now);
                    }
                    Step::Collapse => {
                        animator.begin_collapse(None, now);
                    }
                    Step::OpenDirect => animator.open_direct(),
                }
                let after = animator.state();
                let entered = before.phase() != after.phase();
                match after {
                    AnimationState::DialogOpen { geometry: Some(_), .. } if entered => {
                        prop_assert_eq!(before.phase(), Phase::Expanding);
                    }
                    AnimationState::DialogOpen { geometry: None, .. } if entered => {
                        prop_assert_eq!(before.phase(), Phase::PreparingToExpand);
                    }
                    AnimationState::Expanding { .. } if entered => {
                        prop_assert_eq!(before.phase(), Phase::PreparingToExpand);
                    }
                    AnimationState::Collapsing { .. } if entered => {
                        prop_assert_eq!(before.phase(), Phase::DialogOpen);
                    }
                    AnimationState::Idle => assert_clean_idle(&animator),
                    _ => {}
                }
            }

            // Whatever is in flight, a collapse always lands back on a clean idle.
            if animator.phase() == Phase::Collapsing {
                animator.tick(now + DEFAULT_DURATION);
                assert_clean_idle(&animator);
            }
            if animator.phase() == Phase::DialogOpen {
                animator.begin_collapse(None, now);
                animator.tick(now + DEFAULT_DURATION);
                assert_clean_idle(&animator);
            }
        }
    }
}
