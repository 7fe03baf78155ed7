use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::color::Rgba;
use crate::components::reaction_graph::{
	InteractionMode, ReactionGraphCanvas, RunRequest, ShapeKind, StreamStart,
};
use crate::components::time_chart::TimeChart;
use crate::config::ViewerConfig;
use crate::params::ParamControl;
use crate::session::SimulationMode;
use crate::viewer::Viewer;

type SharedViewer = StoredValue<Viewer, LocalStorage>;

fn parse_or<T: std::str::FromStr>(signal: RwSignal<String>, fallback: T) -> T {
	signal.with_untracked(|s| s.trim().parse().unwrap_or(fallback))
}

/// A colour input forwarding parsed colours to `apply`.
#[component]
fn ColorInput(
	label: &'static str,
	initial: &'static str,
	viewer: SharedViewer,
	apply: fn(&Viewer, Rgba),
) -> impl IntoView {
	view! {
		<label class="color-input">
			{label}
			<input
				type="color"
				value=initial
				on:input=move |ev| {
					match Rgba::parse(&event_target_value(&ev)) {
						Some(color) => viewer.with_value(|v| apply(v, color)),
						None => log::warn!("Ignoring colour {}", event_target_value(&ev)),
					}
				}
			/>
		</label>
	}
}

/// Clickable list of every shape in the diagram.
#[component]
fn Legend(viewer: SharedViewer) -> impl IntoView {
	let legend = viewer.with_value(|v| v.legend);
	view! {
		<ul class="legend">
			<For
				each=move || legend.get()
				key=|entry| (entry.index, entry.id.clone())
				children=move |entry| {
					let class = match entry.kind {
						ShapeKind::Species => "species",
						ShapeKind::Reaction => "reaction",
					};
					let index = entry.index;
					view! {
						<li
							class=class
							on:click=move |ev: MouseEvent| {
								viewer.with_value(|v| v.click_shape(index, ev.shift_key()))
							}
						>
							{entry.id}
						</li>
					}
				}
			/>
		</ul>
	}
}

/// Range control for one parameter, with editable bounds.
#[component]
fn ParamSlider(name: String, viewer: SharedViewer) -> impl IntoView {
	let controls = viewer.with_value(|v| v.controls);
	let key = name.clone();
	let field = move |f: fn(&ParamControl) -> f64| {
		let key = key.clone();
		move || {
			controls.with(|cs| {
				cs.iter()
					.find(|c| c.name == key)
					.map(f)
					.unwrap_or_default()
					.to_string()
			})
		}
	};
	let (n_min, n_slider, n_max) = (name.clone(), name.clone(), name.clone());
	view! {
		<li class="slider">
			<label>{format!("{name} = ")}</label>
			<output>{field(|c| c.value)}</output>
			<div>
				<input
					class="min-input"
					type="number"
					prop:value=field(|c| c.min)
					on:change=move |ev| {
						if let Ok(min) = event_target_value(&ev).parse() {
							viewer.with_value(|v| v.set_param_min(&n_min, min));
						}
					}
				/>
				<input
					class="slider"
					type="range"
					min=field(|c| c.min)
					max=field(|c| c.max)
					step=field(|c| c.step)
					prop:value=field(|c| c.value)
					on:input=move |ev| {
						if let Ok(value) = event_target_value(&ev).parse() {
							viewer.with_value(|v| v.set_param_value(&n_slider, value));
						}
					}
				/>
				<input
					class="max-input"
					type="number"
					prop:value=field(|c| c.max)
					on:change=move |ev| {
						if let Ok(max) = event_target_value(&ev).parse() {
							viewer.with_value(|v| v.set_param_max(&n_max, max));
						}
					}
				/>
			</div>
		</li>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = ViewerConfig::load();
	let window_default = config.chart_window.to_string();
	let viewer: SharedViewer = StoredValue::new_local(Viewer::new(config));
	let (params, controls, history_len, sbml) = viewer.with_value(|v| (v.params, v.controls, v.history_len, v.sbml));

	let sim_mode = RwSignal::new(SimulationMode::Offline);
	let interaction = RwSignal::new(InteractionMode::Select);
	let (offline_start, offline_end, offline_steps) =
		(RwSignal::new("0".to_string()), RwSignal::new("100".to_string()), RwSignal::new("1000".to_string()));
	let (online_start, online_frequency, online_step) =
		(RwSignal::new("0".to_string()), RwSignal::new("10".to_string()), RwSignal::new("0.1".to_string()));
	let windowed = RwSignal::new(false);
	let window_size = RwSignal::new(window_default);
	let timepoint = RwSignal::new(0usize);

	let apply_window = move || {
		let window = windowed.get_untracked().then(|| parse_or(window_size, 0usize));
		viewer.with_value(|v| v.set_window(window));
	};

	let set_interaction = move |mode: InteractionMode| {
		interaction.set(mode);
		viewer.with_value(|v| v.set_interaction_mode(mode));
	};
	let set_sim = move |mode: SimulationMode| {
		sim_mode.set(mode);
		timepoint.set(0);
		viewer.with_value(|v| v.set_sim_mode(mode));
	};

	let sbml_href = move || {
		sbml.get().map(|text| {
			format!(
				"data:text/plain;charset=utf-8,{}",
				String::from(js_sys::encode_uri_component(&text))
			)
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="viewer">
				<aside class="controls">
					<fieldset>
						<legend>"Click mode"</legend>
						<label>
							<input
								type="radio"
								name="interaction"
								prop:checked=move || interaction.get() == InteractionMode::Select
								on:change=move |_| set_interaction(InteractionMode::Select)
							/>
							"Select"
						</label>
						<label>
							<input
								type="radio"
								name="interaction"
								prop:checked=move || interaction.get() == InteractionMode::Plot
								on:change=move |_| set_interaction(InteractionMode::Plot)
							/>
							"Plot"
						</label>
						<button on:click=move |_| viewer.with_value(Viewer::select_all)>"Select all"</button>
					</fieldset>

					<Legend viewer=viewer />

					<fieldset>
						<legend>"Colours"</legend>
						<ColorInput label="Species fill" initial="#ffffff" viewer=viewer apply=Viewer::set_node_fill_color />
						<ColorInput label="Species edge" initial="#000000" viewer=viewer apply=Viewer::set_node_edge_color />
						<ColorInput label="Reaction fill" initial="#000000" viewer=viewer apply=Viewer::set_hyperedge_fill_color />
						<ColorInput label="Reaction edge" initial="#000000" viewer=viewer apply=Viewer::set_hyperedge_edge_color />
						<ColorInput label="High" initial="#f93f3f" viewer=viewer apply=Viewer::set_gradient_hi />
						<ColorInput label="Low" initial="#01dff7" viewer=viewer apply=Viewer::set_gradient_lo />
						<label>
							"Line width"
							<input
								type="number"
								min="0.5"
								step="0.5"
								value="1"
								on:input=move |ev| {
									if let Ok(width) = event_target_value(&ev).parse() {
										viewer.with_value(|v| v.set_line_width(width));
									}
								}
							/>
						</label>
					</fieldset>

					<fieldset>
						<legend>"Simulation"</legend>
						<label>
							<input
								type="radio"
								name="sim-mode"
								prop:checked=move || sim_mode.get() == SimulationMode::Offline
								on:change=move |_| set_sim(SimulationMode::Offline)
							/>
							"Offline"
						</label>
						<label>
							<input
								type="radio"
								name="sim-mode"
								prop:checked=move || sim_mode.get() == SimulationMode::Online
								on:change=move |_| set_sim(SimulationMode::Online)
							/>
							"Online"
						</label>

						<form
							class="offline-form"
							style:display=move || if sim_mode.get() == SimulationMode::Offline { "flex" } else { "none" }
							on:submit=move |ev| {
								ev.prevent_default();
								let request = RunRequest {
									start: parse_or(offline_start, 0.0),
									end: parse_or(offline_end, 100.0),
									steps: parse_or(offline_steps, 1000u32),
								};
								timepoint.set(0);
								viewer.with_value(|v| v.run_offline(request));
							}
						>
							<input type="number" step="any" title="Start" bind:value=offline_start />
							<input type="number" step="any" title="End" bind:value=offline_end />
							<input type="number" min="1" title="Steps" bind:value=offline_steps />
							<button type="submit">"Run"</button>
						</form>

						<form
							class="online-form"
							style:display=move || if sim_mode.get() == SimulationMode::Online { "flex" } else { "none" }
							on:submit=move |ev| {
								ev.prevent_default();
								let start = StreamStart {
									start: parse_or(online_start, 0.0),
									frequency: parse_or(online_frequency, 10.0),
									step_size: parse_or(online_step, 0.1),
								};
								viewer.with_value(|v| v.start_online(start));
							}
						>
							<input type="number" step="any" title="Start" bind:value=online_start />
							<input type="number" step="any" title="Frequency" bind:value=online_frequency />
							<input type="number" step="any" title="Step size" bind:value=online_step />
							<button type="submit">"Start"</button>
							<button type="button" on:click=move |_| viewer.with_value(Viewer::pause_online)>"Pause"</button>
							<button type="button" on:click=move |_| viewer.with_value(Viewer::end_online)>"End"</button>
						</form>
					</fieldset>

					<fieldset>
						<legend>"Chart"</legend>
						<label>
							<input
								type="checkbox"
								prop:checked=move || windowed.get()
								on:change=move |ev| {
									windowed.set(event_target_checked(&ev));
									apply_window();
								}
							/>
							"Trailing window"
						</label>
						<input
							type="number"
							min="0"
							bind:value=window_size
							on:change=move |_| apply_window()
						/>
						<label>
							"Time point"
							<input
								type="range"
								min="0"
								max=move || history_len.get().saturating_sub(1).to_string()
								prop:value=move || timepoint.get().to_string()
								on:input=move |ev| {
									if let Ok(index) = event_target_value(&ev).parse::<usize>() {
										timepoint.set(index);
										viewer.with_value(|v| v.set_timepoint(index));
									}
								}
							/>
						</label>
					</fieldset>

					<fieldset>
						<legend>"Layout"</legend>
						<button on:click=move |_| viewer.with_value(Viewer::redraw)>"Redraw"</button>
						<a
							class="sbml-download"
							download="model.xml"
							href=sbml_href
							style:display=move || if sbml.get().is_some() { "block" } else { "none" }
						>
							"Download SBML"
						</a>
					</fieldset>

					<fieldset>
						<legend>"Parameters"</legend>
						<ul class="parameter-list">
							<For
								each=move || params.get()
								key=|param| param.clone()
								children=move |param| {
									let name = param.clone();
									view! {
										<li on:click=move |_| viewer.with_value(|v| v.toggle_param(name.clone()))>
											{param}
										</li>
									}
								}
							/>
						</ul>
						<ul class="sliders">
							<For
								each=move || controls.get()
								key=|control| control.name.clone()
								children=move |control| view! { <ParamSlider name=control.name viewer=viewer /> }
							/>
						</ul>
					</fieldset>
				</aside>

				<main class="canvases">
					<ReactionGraphCanvas viewer=viewer.get_value() />
					<TimeChart viewer=viewer.get_value() />
				</main>
			</div>
		</ErrorBoundary>
	}
}
