use billboard_lib::{board::{PreviewSession, SessionId}, media::MediaKind};
use web_sys::{Element, ScrollBehavior, ScrollIntoViewOptions};
use yew::{function_component, html, use_effect_with_deps, use_node_ref, Callback, Html, MouseEvent, Properties};

use crate::browser::PickedFile;

const MEDIA_STYLE: &'static str = "max-width: 100%; height: auto;";

#[derive(Properties, PartialEq)]
pub struct PreviewProps {
    pub session: PreviewSession<PickedFile>,
    pub on_predict: Callback<SessionId>,
}

/// One preview session: the media, its name and size, the predict control
/// and the returned image if there is one.
#[function_component]
pub fn Preview(props: &PreviewProps) -> Html {
    let container_ref = use_node_ref();

    let container_ref_effect = container_ref.clone();
    use_effect_with_deps(move |_| {
        if let Some(container) = container_ref_effect.cast::<Element>() {
            let mut options = ScrollIntoViewOptions::new();
            options.behavior(ScrollBehavior::Smooth);
            container.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }, ());

    let session = &props.session;

    html! {
        <div class="preview-container" ref={container_ref}>
            <div class="media-wrapper">
                <div class="media-item">
                    {match session.kind {
                        MediaKind::Image => html! {
                            <img class="img-fluid rounded" style={MEDIA_STYLE} src={session.data_url.clone()}/>
                        },
                        MediaKind::Video => html! {
                            <video class="img-fluid rounded" style={MEDIA_STYLE} src={session.data_url.clone()} controls=true/>
                        },
                    }}
                    <p class="mt-2 mb-0 text-truncate">{session.file.name.clone()}</p>
                    <small class="text-muted d-block">{session.file.size_label()}</small>
                    <button class="btn btn-primary mt-3" onclick={
                        let on_predict = props.on_predict.clone();
                        let id = session.id;
                        Callback::from(move |_e: MouseEvent| on_predict.emit(id))
                    } disabled={!session.predict_enabled()}>{session.predict_label()}</button>
                </div>
            </div>
            {match &session.returned {
                Some(returned) => html! {
                    <div class="returned-image-container">
                        <p class="mt-2 mb-0">{returned.label()}</p>
                        <img class="img-fluid rounded mt-3" style={MEDIA_STYLE} src={returned.url.clone()}/>
                    </div>
                },
                None => html! {}
            }}
        </div>
    }
}
