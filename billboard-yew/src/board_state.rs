use std::rc::Rc;

use billboard_lib::{board::{BatchId, PredictOutcome, PreviewBoard, SessionId}, error::PredictError, media::MediaFile};
use log::info;
use yew::Reducible;

use crate::browser::{revoke_object_url, PickedFile};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardState(pub PreviewBoard<PickedFile>);

pub enum BoardAction {
    PreviewRead {
        batch: BatchId,
        file: MediaFile<PickedFile>,
        data_url: String,
    },
    BeginPredict(SessionId),
    FinishPredict(SessionId, Result<String, PredictError>),
}

impl Reducible for BoardState {
    type Action = BoardAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut board = self.0.clone();
        match action {
            BoardAction::PreviewRead { batch, file, data_url } => {
                let name = file.name.clone();
                if board.insert_preview(batch, file, data_url).is_none() {
                    info!("Dropped preview of {} from a superseded selection", name);
                }
            },
            BoardAction::BeginPredict(id) => {
                if board.begin_predict(id).is_none() {
                    return self;
                }
            },
            BoardAction::FinishPredict(id, result) => match board.finish_predict(id, result) {
                PredictOutcome::Returned => info!("Got predict result for session {}", id),
                PredictOutcome::Failed(_) => {},
                PredictOutcome::Orphaned => info!("Predict result for session {} arrived after it was cleared", id),
            },
        }

        for url in board.drain_released() {
            revoke_object_url(&url);
        }
        Rc::new(BoardState(board))
    }
}
