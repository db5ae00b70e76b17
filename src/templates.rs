use maud::{DOCTYPE, Markup, PreEscaped, html};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Health is polled on this interval; the script also re-checks before a
/// search while offline.
const HEALTH_POLL_MS: u32 = 30_000;

pub fn index_page() -> String {
    page(
        "Movie Favorites",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-5xl mx-auto px-6 py-10" {
                    div class="flex items-center justify-between" {
                        h1 class="text-3xl font-bold text-gray-900" { "Movie Favorites" }
                        span id="status" class="rounded-full px-3 py-1 text-xs font-semibold bg-gray-200 text-gray-700" { "checking" }
                    }

                    form id="search-form" class="mt-8 flex gap-3" {
                        input id="query" name="query" class="flex-1 rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" placeholder="Search by title" required;
                        button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Search" }
                    }
                    p id="error" class="mt-3 text-sm text-red-600" {}
                    div id="details" class="mt-6 hidden bg-white shadow rounded-lg p-6" {}

                    h2 class="mt-10 text-xl font-semibold text-gray-900" { "Results" }
                    div id="results" class="mt-4 grid gap-4 grid-cols-2 md:grid-cols-4" {}

                    h2 class="mt-10 text-xl font-semibold text-gray-900" { "Favorites" }
                    div id="favorites" class="mt-4 grid gap-4 grid-cols-2 md:grid-cols-4" {}
                }
            }
            script { (PreEscaped(client_script())) }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn client_script() -> String {
    format!(
        r#"
const state = {{ results: [], favorites: [], online: true }};
const $ = (id) => document.getElementById(id);

function setOnline(online) {{
  state.online = online;
  const badge = $("status");
  badge.textContent = online ? "online" : "offline";
  badge.className = "rounded-full px-3 py-1 text-xs font-semibold " +
    (online ? "bg-green-100 text-green-800" : "bg-red-100 text-red-800");
}}

async function api(path, options) {{
  let resp;
  try {{
    resp = await fetch("/api" + path, options);
  }} catch (err) {{
    setOnline(false);
    throw new Error("backend unavailable");
  }}
  const body = await resp.json().catch(() => ({{}}));
  if (!resp.ok) throw new Error(body.error || resp.statusText);
  return body;
}}

async function checkHealth() {{
  try {{ await api("/health"); setOnline(true); $("error").textContent = ""; }}
  catch (err) {{ setOnline(false); }}
}}

function card(movie, actions) {{
  const el = document.createElement("div");
  el.className = "bg-white shadow rounded-lg p-3 flex flex-col";
  if (movie.poster && movie.poster !== "N/A") {{
    const img = document.createElement("img");
    img.src = movie.poster; img.alt = movie.title; img.className = "rounded";
    el.appendChild(img);
  }}
  const title = document.createElement("p");
  title.className = "mt-2 font-medium text-gray-900";
  title.textContent = movie.title + " (" + movie.year + ")";
  el.appendChild(title);
  for (const action of actions) {{
    const btn = document.createElement("button");
    btn.className = "pt-2 text-sm text-blue-600 hover:text-blue-800 text-left";
    btn.textContent = action.label;
    btn.onclick = action.run;
    el.appendChild(btn);
  }}
  return el;
}}

function render() {{
  $("results").replaceChildren(...state.results.map((m) => card(
    {{ title: m.Title, year: m.Year, poster: m.Poster }},
    [{{ label: "Details", run: () => showDetails(m.imdbID) }},
     {{ label: "Add to favorites", run: () => addFavorite(m) }}])));
  $("favorites").replaceChildren(...state.favorites.map((f) => card(
    f, [{{ label: "Details", run: () => showDetails(f.imdb_id) }},
        {{ label: "Remove", run: () => removeFavorite(f.imdb_id) }}])));
}}

async function loadFavorites() {{
  try {{ state.favorites = await api("/movies/favorites/all"); render(); }}
  catch (err) {{ console.error(err); }}
}}

async function showDetails(id) {{
  const panel = $("details");
  try {{
    const movie = await api("/movies/" + encodeURIComponent(id));
    const heading = document.createElement("h3");
    heading.className = "text-lg font-semibold text-gray-900";
    heading.textContent = movie.Title + " (" + movie.Year + ")";
    const lines = ["Director", "Actors", "Runtime", "Genre", "Plot"]
      .filter((key) => movie[key] && movie[key] !== "N/A")
      .map((key) => {{
        const p = document.createElement("p");
        p.className = "mt-1 text-sm text-gray-700";
        p.textContent = key + ": " + movie[key];
        return p;
      }});
    panel.replaceChildren(heading, ...lines);
    panel.classList.remove("hidden");
  }} catch (err) {{ $("error").textContent = err.message; }}
}}

async function search(query) {{
  if (!state.online) {{ await checkHealth(); if (!state.online) return; }}
  try {{
    const page = await api("/movies/search?query=" + encodeURIComponent(query));
    state.results = page.Search || [];
    $("error").textContent = "";
  }} catch (err) {{
    state.results = [];
    $("error").textContent = err.message;
  }}
  render();
}}

async function addFavorite(m) {{
  try {{
    await api("/movies/favorites", {{
      method: "POST",
      headers: {{ "Content-Type": "application/json" }},
      body: JSON.stringify({{ imdb_id: m.imdbID, title: m.Title, year: m.Year, type: m.Type, poster: m.Poster }}),
    }});
    await loadFavorites();
  }} catch (err) {{ $("error").textContent = err.message; }}
}}

async function removeFavorite(id) {{
  try {{
    await api("/movies/favorites/" + encodeURIComponent(id), {{ method: "DELETE" }});
    await loadFavorites();
  }} catch (err) {{ $("error").textContent = err.message; }}
}}

$("search-form").addEventListener("submit", (e) => {{ e.preventDefault(); search($("query").value); }});
checkHealth();
loadFavorites();
setInterval(checkHealth, {HEALTH_POLL_MS});
"#
    )
}
