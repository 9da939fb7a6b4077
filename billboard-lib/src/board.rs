//! The set of preview sessions on display and their predict state.
//!
//! The board owns every session the widget renders. Input batches are
//! numbered when they arrive; a read that completes for a newer batch replaces
//! the display, one for the current batch joins it, and one for a superseded
//! batch is thrown away.

use std::{collections::HashSet, rc::Rc};

use crate::{error::PredictError, media::{MediaFile, MediaKind}};

pub type SessionId = u64;
pub type BatchId = u64;

pub const PREDICT_LABEL: &'static str = "Predict";
pub const PREDICTING_LABEL: &'static str = "Predicting...";
pub const RETURNED_LABEL: &'static str = "Returned image from server:";

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnedResult {
    pub url: Rc<str>,
}

impl ReturnedResult {
    pub fn label(&self) -> &'static str {
        RETURNED_LABEL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSession<F> {
    pub id: SessionId,
    pub batch: BatchId,
    pub file: MediaFile<F>,
    /// Shared so cloning the board never copies the encoded media.
    pub data_url: Rc<str>,
    pub kind: MediaKind,
    pub predicting: bool,
    pub returned: Option<ReturnedResult>,
}

impl<F> PreviewSession<F> {
    pub fn predict_label(&self) -> &'static str {
        if self.predicting {
            PREDICTING_LABEL
        } else {
            PREDICT_LABEL
        }
    }

    pub fn predict_enabled(&self) -> bool {
        !self.predicting
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictOutcome {
    Returned,
    Failed(PredictError),
    /// The session left the display while its request was in flight.
    Orphaned,
}

/// Hands out increasing batch numbers, one per selection. A selection takes
/// its number when it starts, before any awaiting, so the order on screen
/// follows the order the user acted in.
#[derive(Debug, Default)]
pub struct BatchCounter {
    next_batch: BatchId,
}

impl BatchCounter {
    pub fn next_batch(&mut self) -> BatchId {
        let batch = self.next_batch;
        self.next_batch += 1;
        batch
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBoard<F> {
    current_batch: Option<BatchId>,
    next_session_id: SessionId,
    sessions: Vec<PreviewSession<F>>,
    released: Vec<String>,
}

impl<F> Default for PreviewBoard<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> PreviewBoard<F> {
    pub fn new() -> Self {
        Self {
            current_batch: None,
            next_session_id: 0,
            sessions: Vec::new(),
            released: Vec::new(),
        }
    }

    pub fn sessions(&self) -> &[PreviewSession<F>] {
        &self.sessions
    }

    pub fn session(&self, id: SessionId) -> Option<&PreviewSession<F>> {
        self.sessions.iter().find(|session| session.id == id)
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut PreviewSession<F>> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    /// Puts a finished read on display. Nothing changes for a new batch until
    /// its first preview lands here.
    pub fn insert_preview<U: Into<Rc<str>>>(&mut self, batch: BatchId, file: MediaFile<F>, data_url: U) -> Option<SessionId> {
        match self.current_batch {
            Some(current) if batch < current => return None,
            Some(current) if batch == current => {},
            _ => {
                for session in self.sessions.drain(..) {
                    if let Some(returned) = session.returned {
                        self.released.push(returned.url.to_string());
                    }
                }
                self.current_batch = Some(batch);
            }
        }

        let id = self.next_session_id;
        self.next_session_id += 1;
        self.sessions.push(PreviewSession {
            id,
            batch,
            kind: file.kind(),
            file,
            data_url: data_url.into(),
            predicting: false,
            returned: None,
        });
        Some(id)
    }

    /// Disables the session's control and hands back the file to upload.
    /// `None` when the session is gone or a request is already pending.
    pub fn begin_predict(&mut self, id: SessionId) -> Option<&MediaFile<F>> {
        let session = self.session_mut(id)?;
        if session.predicting {
            return None;
        }
        session.predicting = true;
        Some(&session.file)
    }

    /// Settles a predict call. The control is restored whatever the result;
    /// a success replaces the session's previous returned image.
    pub fn finish_predict(&mut self, id: SessionId, result: Result<String, PredictError>) -> PredictOutcome {
        let session = match self.sessions.iter_mut().find(|session| session.id == id) {
            Some(session) => session,
            None => {
                return match result {
                    Ok(url) => {
                        self.released.push(url);
                        PredictOutcome::Orphaned
                    },
                    Err(err) => PredictOutcome::Failed(err),
                }
            }
        };
        session.predicting = false;

        match result {
            Ok(url) => {
                if let Some(previous) = session.returned.replace(ReturnedResult { url: url.into() }) {
                    self.released.push(previous.url.to_string());
                }
                PredictOutcome::Returned
            },
            Err(err) => PredictOutcome::Failed(err),
        }
    }

    /// Object URLs no longer referenced by any session.
    pub fn drain_released(&mut self) -> Vec<String> {
        std::mem::take(&mut self.released)
    }
}

/// Sessions with a predict request on the wire. Checked synchronously at
/// click time, before the board has re-rendered with the control disabled.
#[derive(Debug, Default)]
pub struct PendingPredicts {
    sessions: HashSet<SessionId>,
}

impl PendingPredicts {
    /// `false` if `id` already has a request in flight.
    pub fn try_start(&mut self, id: SessionId) -> bool {
        self.sessions.insert(id)
    }

    pub fn finish(&mut self, id: SessionId) {
        self.sessions.remove(&id);
    }

    pub fn is_pending(&self, id: SessionId) -> bool {
        self.sessions.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{accept_files, tests::FakeFile};

    fn media(name: &'static str, mime_type: &'static str) -> MediaFile<FakeFile> {
        MediaFile::accept(FakeFile::new(name, 2048, mime_type)).unwrap()
    }

    fn board_with_one() -> (PreviewBoard<FakeFile>, SessionId) {
        let mut board = PreviewBoard::new();
        let batch = BatchCounter::default().next_batch();
        let id = board.insert_preview(batch, media("photo.png", "image/png"), String::from("data:image/png;base64,AA")).unwrap();
        (board, id)
    }

    #[test]
    fn new_batch_clears_previous_sessions() {
        let mut board = PreviewBoard::new();
        let mut batches = BatchCounter::default();
        let first = batches.next_batch();
        board.insert_preview(first, media("a.png", "image/png"), String::from("data:a")).unwrap();
        board.insert_preview(first, media("b.mp4", "video/mp4"), String::from("data:b")).unwrap();
        assert_eq!(board.sessions().len(), 2);

        let second = batches.next_batch();
        // still showing the old batch until the new one has something to show
        assert_eq!(board.sessions().len(), 2);
        let id = board.insert_preview(second, media("c.jpg", "image/jpeg"), String::from("data:c")).unwrap();
        assert_eq!(board.sessions().len(), 1);
        assert_eq!(board.sessions()[0].id, id);
        assert_eq!(board.sessions()[0].file.name, "c.jpg");
    }

    #[test]
    fn late_read_from_superseded_batch_is_dropped() {
        let mut board = PreviewBoard::new();
        let mut batches = BatchCounter::default();
        let old = batches.next_batch();
        let new = batches.next_batch();
        board.insert_preview(new, media("new.png", "image/png"), String::from("data:new")).unwrap();
        assert_eq!(board.insert_preview(old, media("old.png", "image/png"), String::from("data:old")), None);
        assert_eq!(board.sessions().len(), 1);
        assert_eq!(board.sessions()[0].file.name, "new.png");
    }

    #[test]
    fn predict_disables_and_restores_control_on_success() {
        let (mut board, id) = board_with_one();
        assert!(board.session(id).unwrap().predict_enabled());

        assert_eq!(board.begin_predict(id).map(|f| f.name.clone()), Some(String::from("photo.png")));
        let session = board.session(id).unwrap();
        assert!(!session.predict_enabled());
        assert_eq!(session.predict_label(), PREDICTING_LABEL);

        // a second click while pending does nothing
        assert!(board.begin_predict(id).is_none());

        assert_eq!(board.finish_predict(id, Ok(String::from("blob:1"))), PredictOutcome::Returned);
        let session = board.session(id).unwrap();
        assert!(session.predict_enabled());
        assert_eq!(session.predict_label(), PREDICT_LABEL);
        assert_eq!(session.returned, Some(ReturnedResult { url: Rc::from("blob:1") }));
    }

    #[test]
    fn second_success_replaces_returned_result() {
        let (mut board, id) = board_with_one();
        board.begin_predict(id);
        board.finish_predict(id, Ok(String::from("blob:1")));
        board.begin_predict(id);
        board.finish_predict(id, Ok(String::from("blob:2")));

        let session = board.session(id).unwrap();
        assert_eq!(session.returned.as_ref().map(|r| &*r.url), Some("blob:2"));
        assert_eq!(session.returned.as_ref().map(|r| r.label()), Some(RETURNED_LABEL));
        assert_eq!(board.drain_released(), vec![String::from("blob:1")]);
        assert!(board.drain_released().is_empty());
    }

    #[test]
    fn failure_restores_control_and_keeps_result() {
        let (mut board, id) = board_with_one();
        board.begin_predict(id);
        board.finish_predict(id, Ok(String::from("blob:1")));

        board.begin_predict(id);
        let outcome = board.finish_predict(id, Err(PredictError::Status(500)));
        assert_eq!(outcome, PredictOutcome::Failed(PredictError::Status(500)));

        let session = board.session(id).unwrap();
        assert!(session.predict_enabled());
        assert_eq!(session.predict_label(), PREDICT_LABEL);
        assert_eq!(session.returned, Some(ReturnedResult { url: Rc::from("blob:1") }));
    }

    #[test]
    fn failure_without_prior_result_adds_nothing() {
        let (mut board, id) = board_with_one();
        board.begin_predict(id);
        board.finish_predict(id, Err(PredictError::Transport(String::from("connection refused"))));
        assert_eq!(board.session(id).unwrap().returned, None);
    }

    #[test]
    fn sessions_predict_independently() {
        let mut board = PreviewBoard::new();
        let batch = BatchCounter::default().next_batch();
        let a = board.insert_preview(batch, media("a.png", "image/png"), String::from("data:a")).unwrap();
        let b = board.insert_preview(batch, media("b.png", "image/png"), String::from("data:b")).unwrap();

        board.begin_predict(a);
        board.begin_predict(b);
        board.finish_predict(b, Ok(String::from("blob:b")));

        assert!(board.session(a).unwrap().predicting);
        assert_eq!(board.session(a).unwrap().returned, None);
        assert!(!board.session(b).unwrap().predicting);

        board.finish_predict(a, Err(PredictError::Status(502)));
        assert_eq!(board.session(b).unwrap().returned.as_ref().map(|r| &*r.url), Some("blob:b"));
    }

    #[test]
    fn result_for_cleared_session_is_released() {
        let (mut board, id) = board_with_one();
        board.begin_predict(id);
        let next = BatchCounter { next_batch: 1 }.next_batch();
        board.insert_preview(next, media("other.jpg", "image/jpeg"), String::from("data:o")).unwrap();

        assert_eq!(board.finish_predict(id, Ok(String::from("blob:late"))), PredictOutcome::Orphaned);
        assert_eq!(board.drain_released(), vec![String::from("blob:late")]);
        assert!(board.sessions().iter().all(|s| s.returned.is_none()));
    }

    #[test]
    fn clearing_releases_returned_images() {
        let (mut board, id) = board_with_one();
        board.begin_predict(id);
        board.finish_predict(id, Ok(String::from("blob:1")));
        let next = BatchCounter { next_batch: 1 }.next_batch();
        board.insert_preview(next, media("x.webp", "image/webp"), String::from("data:x")).unwrap();
        assert_eq!(board.drain_released(), vec![String::from("blob:1")]);
    }

    #[test]
    fn photo_png_end_to_end() {
        let mut board = PreviewBoard::new();
        let accepted = accept_files(vec![FakeFile::new("photo.PNG", 1536, "image/png")]);
        assert_eq!(accepted.len(), 1);

        let batch = BatchCounter::default().next_batch();
        let mut ids = Vec::new();
        for file in accepted {
            ids.extend(board.insert_preview(batch, file, String::from("data:image/png;base64,AA")));
        }
        let id = ids[0];
        let session = board.session(id).unwrap();
        assert_eq!(session.kind, MediaKind::Image);
        assert_eq!(session.file.name, "photo.PNG");
        assert_eq!(session.file.size_label(), "1.5 KB");

        board.begin_predict(id);
        board.finish_predict(id, Ok(String::from("blob:jpeg")));
        let returned: Vec<_> = board.sessions().iter().filter_map(|s| s.returned.as_ref()).collect();
        assert_eq!(returned.len(), 1);
        assert_eq!(&*returned[0].url, "blob:jpeg");
    }

    #[test]
    fn example_reserved_at_startup_loses_to_later_selection() {
        let mut board = PreviewBoard::new();
        let mut batches = BatchCounter::default();
        // the example reserves its batch before its fetch is awaited
        let example = batches.next_batch();
        // the user picks a file while that fetch is still running
        let picked = batches.next_batch();

        board.insert_preview(picked, media("mine.png", "image/png"), String::from("data:mine")).unwrap();
        assert_eq!(board.insert_preview(example, media("exampleImg.jpg", "image/jpeg"), String::from("data:example")), None);

        let names: Vec<&str> = board.sessions().iter().map(|s| s.file.name.as_str()).collect();
        assert_eq!(names, vec!["mine.png"]);
    }

    #[test]
    fn example_shows_when_nothing_was_picked() {
        let mut board = PreviewBoard::new();
        let example = BatchCounter::default().next_batch();
        board.insert_preview(example, media("exampleImg.jpg", "image/jpeg"), String::from("data:example")).unwrap();
        assert_eq!(board.sessions()[0].file.name, "exampleImg.jpg");
    }

    #[test]
    fn cloned_board_shares_media_data() {
        let (mut board, id) = board_with_one();
        board.begin_predict(id);
        board.finish_predict(id, Ok(String::from("blob:1")));

        let copy = board.clone();
        let original = board.session(id).unwrap();
        let cloned = copy.session(id).unwrap();
        assert!(Rc::ptr_eq(&original.data_url, &cloned.data_url));
        assert!(Rc::ptr_eq(&original.returned.as_ref().unwrap().url, &cloned.returned.as_ref().unwrap().url));
        assert_eq!(original, cloned);
    }

    #[test]
    fn pending_predicts_refuse_a_second_start() {
        let mut pending = PendingPredicts::default();
        assert!(pending.try_start(3));
        assert!(!pending.try_start(3));
        assert!(pending.try_start(4));
        assert!(pending.is_pending(3));

        pending.finish(3);
        assert!(!pending.is_pending(3));
        assert!(pending.try_start(3));
    }
}
