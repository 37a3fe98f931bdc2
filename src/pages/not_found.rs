use leptos::prelude::*;
use leptos_router::components::A;

use crate::auth::EDITOR_PATH;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="syn-page">
			<h1>"Nothing here"</h1>
			<A href=EDITOR_PATH>"Back to the editor"</A>
		</div>
	}
}
