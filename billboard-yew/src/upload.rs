use std::cell::RefCell;

use billboard_lib::{board::{BatchCounter, BatchId, PendingPredicts, SessionId}, error::PREDICT_FAILED_NOTICE, media::{accept_files, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS}};
use log::error;
use web_sys::HtmlInputElement;
use yew::{classes, function_component, html, platform::spawn_local, use_effect_with_deps, use_mut_ref, use_node_ref, use_reducer, use_state_eq, Callback, DragEvent, Html, MouseEvent, TargetCast, UseReducerDispatcher};

use crate::{board_state::{BoardAction, BoardState}, browser::{fetch_example, notify, picked_files, predict, read_data_url, PickedFile}, preview::Preview};

/// Numbers a fresh selection and previews it.
fn handle_files(files: Vec<PickedFile>, batches: &RefCell<BatchCounter>, dispatcher: &UseReducerDispatcher<BoardState>) {
    let batch = batches.borrow_mut().next_batch();
    preview_batch(files, batch, dispatcher);
}

/// Filters one selection and starts reading every accepted file. Each read
/// lands on the board as its own preview session once it completes.
fn preview_batch(files: Vec<PickedFile>, batch: BatchId, dispatcher: &UseReducerDispatcher<BoardState>) {
    for file in accept_files(files) {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            match read_data_url(&file.handle).await {
                Ok(data_url) => dispatcher.dispatch(BoardAction::PreviewRead { batch, file, data_url }),
                Err(err) => error!("Failed to render preview: {}", err),
            }
        });
    }
}

fn accept_attribute() -> String {
    IMAGE_EXTENSIONS.iter()
        .chain(VIDEO_EXTENSIONS.iter())
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<String>>()
        .join(",")
}

#[function_component]
pub fn UploadWidget() -> Html {
    let board = use_reducer(BoardState::default);
    let batches = use_mut_ref(BatchCounter::default);
    let dragging_handle = use_state_eq(|| false);
    let file_input_ref = use_node_ref();

    let pending = use_mut_ref(PendingPredicts::default);

    let batches_effect = batches.clone();
    let dispatcher_effect = board.dispatcher();
    use_effect_with_deps(move |_| {
        let example_batch = batches_effect.borrow_mut().next_batch();
        spawn_local(async move {
            match fetch_example().await {
                Ok(file) => preview_batch(vec![file], example_batch, &dispatcher_effect),
                Err(err) => error!("Failed to load example image: {}", err),
            }
        });
    }, ());

    let on_predict = {
        let board = board.clone();
        let pending = pending.clone();
        Callback::from(move |id: SessionId| {
            let file = match (*board).0.session(id) {
                Some(session) if session.predict_enabled() => session.file.handle.clone(),
                _ => return,
            };
            if !pending.borrow_mut().try_start(id) {
                return;
            }
            let dispatcher = board.dispatcher();
            dispatcher.dispatch(BoardAction::BeginPredict(id));
            let pending = pending.clone();
            spawn_local(async move {
                let result = predict(&file).await;
                if let Err(err) = &result {
                    error!("Prediction failed: {}", err);
                    notify(PREDICT_FAILED_NOTICE);
                }
                pending.borrow_mut().finish(id);
                dispatcher.dispatch(BoardAction::FinishPredict(id, result));
            });
        })
    };

    let swallow_drag = Callback::from(|e: DragEvent| {
        e.prevent_default();
        e.stop_propagation();
    });

    let highlight = {
        let dragging_handle = dragging_handle.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            e.stop_propagation();
            dragging_handle.set(true);
        })
    };

    html! {
        <div class="upload-page" ondragenter={swallow_drag.clone()} ondragover={swallow_drag.clone()} ondrop={swallow_drag}>
            <div class={classes!("upload-container", (*dragging_handle).then_some("border-primary"))}
                ondragenter={highlight.clone()}
                ondragover={highlight}
                ondragleave={
                    let dragging_handle = dragging_handle.clone();
                    Callback::from(move |e: DragEvent| {
                        e.prevent_default();
                        e.stop_propagation();
                        dragging_handle.set(false);
                    })
                }
                ondrop={
                    let dragging_handle = dragging_handle.clone();
                    let batches = batches.clone();
                    let dispatcher = board.dispatcher();
                    Callback::from(move |e: DragEvent| {
                        e.prevent_default();
                        e.stop_propagation();
                        dragging_handle.set(false);
                        if let Some(files) = e.data_transfer().and_then(|data_transfer| data_transfer.files()) {
                            handle_files(picked_files(&files), &batches, &dispatcher);
                        }
                    })
                }>
                <p>{"Drag and drop an image or video here"}</p>
                <p class="text-muted">{"or"}</p>
                <button class="btn btn-light" onclick={
                    let file_input_ref = file_input_ref.clone();
                    Callback::from(move |_e: MouseEvent| {
                        if let Some(file_input) = file_input_ref.cast::<HtmlInputElement>() {
                            file_input.click();
                        }
                    })
                }>{"Select files"}</button>
                <input type="file" id="fileInput" ref={file_input_ref} multiple=true accept={accept_attribute()} style="display: none;" onchange={
                    let batches = batches.clone();
                    let dispatcher = board.dispatcher();
                    Callback::from(move |e: yew::Event| {
                        let files = e.target_dyn_into::<HtmlInputElement>().and_then(|file_input| file_input.files());
                        if let Some(files) = files {
                            handle_files(picked_files(&files), &batches, &dispatcher);
                        }
                    })
                }/>
            </div>
            <div id="mediaPreview">
                {(*board).0.sessions().iter().map(|session| {
                    html! { <Preview key={session.id} session={session.clone()} on_predict={on_predict.clone()}/> }
                }).collect::<Html>()}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_accepts_every_known_extension() {
        assert_eq!(accept_attribute(), ".jpg,.jpeg,.png,.bmp,.webp,.mov,.mp4");
    }
}
