use billboard_yew::upload::UploadWidget;
use yew::{function_component, html, Html};

#[function_component]
fn App() -> Html {
    html! {
        <div class="container">
            <h1>{"Billboard Detection"}</h1>
            <UploadWidget/>
        </div>
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
