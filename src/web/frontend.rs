//! Embedded HTML/CSS/JS frontend for glycowise.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. Chat transcripts
//! live in the page; the server keeps no per-user state.

/// The complete single-page UI.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>glycowise</title>
<style>
:root {
  --bg: #f6f8fa;
  --surface: #ffffff;
  --border: #d0d7de;
  --text: #1f2328;
  --text-muted: #656d76;
  --accent: #0d9488;
  --blue: #2563eb;
  --red: #cf222e;
  --yellow: #9a6700;
  --green: #1a7f37;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 15px;
  line-height: 1.5;
}

.app { max-width: 1000px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; color: var(--accent); }
nav a {
  margin-left: 16px;
  color: var(--text-muted);
  text-decoration: none;
  font-weight: 500;
}
nav a.active { color: var(--accent); }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 16px;
}
.card h3 { margin-bottom: 4px; }
.card a { color: var(--blue); text-decoration: none; }
.muted { color: var(--text-muted); font-size: 13px; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 16px; }
.tag {
  display: inline-block;
  padding: 2px 8px;
  margin: 2px 4px 2px 0;
  border-radius: 12px;
  background: #ccfbf1;
  color: #115e59;
  font-size: 12px;
}
.chip { cursor: pointer; border: 1px solid var(--border); background: var(--surface); color: var(--text); }
.chip.on { background: var(--accent); color: #fff; border-color: var(--accent); }
.toolbar { display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 16px; }
input[type=text], select {
  padding: 8px 10px;
  border: 1px solid var(--border);
  border-radius: 6px;
  font: inherit;
}
button.primary {
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: var(--accent);
  color: #fff;
  font: inherit;
  cursor: pointer;
}
button.primary:disabled { opacity: 0.5; cursor: wait; }

.field { margin-bottom: 12px; }
.field label { display: flex; justify-content: space-between; font-weight: 500; }
.field input[type=range] { width: 100%; }

.result.high { border-left: 4px solid var(--red); }
.result.moderate { border-left: 4px solid var(--yellow); }
.result.low { border-left: 4px solid var(--green); }

.chat { display: flex; flex-direction: column; height: 420px; }
.messages { flex: 1; overflow-y: auto; margin-bottom: 8px; }
.msg { padding: 8px 12px; border-radius: 8px; margin: 4px 0; max-width: 85%; white-space: pre-wrap; }
.msg.user { background: var(--accent); color: #fff; margin-left: auto; }
.msg.assistant { background: #eaeef2; }
.chat form { display: flex; gap: 8px; }
.chat input { flex: 1; }
.tabs { display: flex; gap: 8px; margin-bottom: 16px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>glycowise</h1>
    <nav id="nav">
      <a href="/" data-link>Home</a>
      <a href="/predict" data-link>Risk Check</a>
      <a href="/diet" data-link>Diet</a>
      <a href="/exercise" data-link>Exercise</a>
    </nav>
  </header>
  <main id="view"></main>
</div>

<script>
// ---------------------------------------------------------------------------
// State (transcripts are per page load, one per topic)
// ---------------------------------------------------------------------------
const chats = {
  diet: { messages: [], apology: '', seeding: null, busy: false },
  exercise: { messages: [], apology: '', seeding: null, busy: false },
};
let form = null;
let values = null;
let predicting = false;
let dietTags = [];

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.statusText);
  return data;
}

function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

const view = () => document.getElementById('view');

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------
function go(path) {
  history.pushState(null, '', path);
  render();
}

document.addEventListener('click', e => {
  const a = e.target.closest('a[data-link]');
  if (!a) return;
  e.preventDefault();
  go(a.getAttribute('href'));
});
window.addEventListener('popstate', render);

function render() {
  const path = location.pathname;
  document.querySelectorAll('#nav a').forEach(a => {
    const href = a.getAttribute('href');
    a.classList.toggle('active', href === '/' ? path === '/' : path.startsWith(href));
  });
  const parts = path.split('/').filter(Boolean);
  if (parts.length === 0) return renderHome();
  if (parts[0] === 'predict') return renderPredict();
  if (parts[0] === 'diet') return parts[1] ? renderDietDetail(parts[1]) : renderDiet();
  if (parts[0] === 'exercise') return parts[1] ? renderExerciseDetail(parts[1]) : renderExercise();
  renderHome();
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------
function renderHome() {
  view().innerHTML = `
    <div class="card"><h2>Know your risk, plan your day</h2>
    <p class="muted">Estimate your diabetes risk, browse diet and exercise plans, and ask focused questions.</p></div>
    <div class="grid">
      <div class="card"><h3><a href="/predict" data-link>Risk Check</a></h3><p class="muted">Enter a few health metrics for an AI-based estimate.</p></div>
      <div class="card"><h3><a href="/diet" data-link>Diet Plans</a></h3><p class="muted">Meal plans and a nutrition assistant.</p></div>
      <div class="card"><h3><a href="/exercise" data-link>Exercise Plans</a></h3><p class="muted">Weekly routines and a fitness assistant.</p></div>
    </div>`;
}

// ---------------------------------------------------------------------------
// Risk check
// ---------------------------------------------------------------------------
async function renderPredict() {
  if (!form) {
    form = await api('GET', '/api/form');
    values = Object.assign({}, form.defaults);
  }
  view().innerHTML = `
    <div class="card">
      <h2>Diabetes Risk Check</h2>
      <div class="field"><label>Gender</label>
        <select id="gender">${form.genders.map(g => `<option ${g === values.gender ? 'selected' : ''}>${g}</option>`).join('')}</select>
      </div>
      <div id="fields"></div>
      <button class="primary" id="submit">Check risk</button>
    </div>
    <div id="result"></div>`;
  document.getElementById('gender').addEventListener('change', e => {
    values.gender = e.target.value;
    renderFields();
  });
  document.getElementById('submit').addEventListener('click', submitPrediction);
  renderFields();
}

function renderFields() {
  const el = document.getElementById('fields');
  el.innerHTML = form.metrics
    .filter(m => m.metric !== 'pregnancies' || values.gender === 'female')
    .map(m => {
      const step = Math.pow(10, -m.decimals);
      return `<div class="field">
        <label>${esc(m.label)} <span id="v-${m.metric}">${values[m.metric]} ${esc(m.unit)}</span></label>
        <input type="range" min="${m.min}" max="${m.max}" step="${step}" value="${values[m.metric]}" data-metric="${m.metric}" data-unit="${esc(m.unit)}">
      </div>`;
    }).join('');
  el.querySelectorAll('input[type=range]').forEach(input => {
    input.addEventListener('input', e => {
      const key = e.target.dataset.metric;
      values[key] = parseFloat(e.target.value);
      document.getElementById('v-' + key).textContent = values[key] + ' ' + e.target.dataset.unit;
    });
  });
}

async function submitPrediction() {
  if (predicting) return;
  predicting = true;
  const btn = document.getElementById('submit');
  const out = document.getElementById('result');
  btn.disabled = true;
  btn.textContent = 'Analyzing...';
  try {
    const r = await api('POST', '/api/predict', values);
    out.innerHTML = `<div class="card result ${esc(r.risk)}">
      <h3>${esc(r.prediction)}</h3>
      <p>Probability: <b>${r.probability_pct}%</b> &middot; Risk: <b>${esc(r.risk)}</b></p>
      <h4>What this means</h4><p>${esc(r.interpretation)}</p>
      <h4>Next steps</h4><ul>${r.next_steps.map(s => `<li>${esc(s)}</li>`).join('')}</ul>
      <p><button class="primary" id="reset">Check again</button></p>
    </div>`;
    document.getElementById('reset').addEventListener('click', () => { out.innerHTML = ''; });
  } catch (e) {
    out.innerHTML = `<div class="card result high">${esc(e.message)}</div>`;
  } finally {
    predicting = false;
    btn.disabled = false;
    btn.textContent = 'Check risk';
  }
}

// ---------------------------------------------------------------------------
// Chat panel (shared by diet and exercise pages)
// ---------------------------------------------------------------------------
function chatHtml(topic) {
  return `<div class="card chat">
    <div class="messages" id="messages"></div>
    <form id="chat-form"><input type="text" id="chat-input" placeholder="Ask a ${topic} question..."><button class="primary" id="chat-send">Send</button></form>
  </div>`;
}

function renderMessages(topic) {
  const el = document.getElementById('messages');
  if (!el) return;
  el.innerHTML = chats[topic].messages.map(m => `<div class="msg ${m.role}">${esc(m.content)}</div>`).join('');
  el.scrollTop = el.scrollHeight;
  const send = document.getElementById('chat-send');
  if (send) send.disabled = chats[topic].busy;
}

// Greeting and apology come from the server so both front ends share them.
function seedChat(topic) {
  const chat = chats[topic];
  if (!chat.seeding) {
    chat.seeding = api('GET', '/api/chat/' + topic)
      .then(seed => {
        chat.messages.unshift({ role: 'assistant', content: seed.greeting });
        chat.apology = seed.apology;
      })
      .catch(err => {
        console.error('chat seed failed', err);
        chat.seeding = null;
      });
  }
  return chat.seeding;
}

async function bindChat(topic) {
  await seedChat(topic);
  renderMessages(topic);
  const chatForm = document.getElementById('chat-form');
  if (!chatForm) return;
  chatForm.addEventListener('submit', async e => {
    e.preventDefault();
    const chat = chats[topic];
    const input = document.getElementById('chat-input');
    const text = input.value;
    if (!text.trim() || chat.busy) return;
    chat.messages.push({ role: 'user', content: text });
    input.value = '';
    chat.busy = true;
    renderMessages(topic);
    try {
      const r = await api('POST', '/api/chat/' + topic, { message: text });
      chat.messages.push({ role: 'assistant', content: r.reply });
    } catch (err) {
      chat.messages.push({ role: 'assistant', content: chat.apology || err.message });
    } finally {
      chat.busy = false;
      renderMessages(topic);
    }
  });
}

function tabs(active, topic) {
  return `<div class="tabs">
    <button class="chip tag ${active === 'chat' ? 'on' : ''}" data-tab="chat">Ask AI Assistant</button>
    <button class="chip tag ${active === 'plans' ? 'on' : ''}" data-tab="plans">${topic === 'diet' ? 'Diet Plans' : 'Exercise Plans'}</button>
  </div><div id="tab-body"></div>`;
}

function bindTabs(topic, showPlans) {
  const show = tab => {
    document.querySelectorAll('[data-tab]').forEach(b => b.classList.toggle('on', b.dataset.tab === tab));
    if (tab === 'chat') {
      document.getElementById('tab-body').innerHTML = chatHtml(topic);
      bindChat(topic);
    } else {
      showPlans();
    }
  };
  document.querySelectorAll('[data-tab]').forEach(b => b.addEventListener('click', () => show(b.dataset.tab)));
  show('chat');
}

// ---------------------------------------------------------------------------
// Diet
// ---------------------------------------------------------------------------
function renderDiet() {
  view().innerHTML = `<h2>Diet Recommendations</h2><br>` + tabs('chat', 'diet');
  bindTabs('diet', showDietPlans);
}

async function showDietPlans() {
  const body = document.getElementById('tab-body');
  body.innerHTML = `<div class="toolbar"><input type="text" id="q" placeholder="Search diet plans..."></div><div class="toolbar" id="chips"></div><div class="grid" id="plans"></div>`;
  const load = async () => {
    const params = new URLSearchParams();
    params.set('q', document.getElementById('q').value);
    dietTags.forEach(t => params.append('tag', t));
    const r = await api('GET', '/api/diet?' + params.toString());
    document.getElementById('chips').innerHTML = r.tag_filters
      .map(t => `<button class="tag chip ${dietTags.includes(t) ? 'on' : ''}" data-tag="${esc(t)}">${esc(t)}</button>`).join('');
    document.querySelectorAll('[data-tag]').forEach(b => b.addEventListener('click', () => {
      const t = b.dataset.tag;
      dietTags = dietTags.includes(t) ? dietTags.filter(x => x !== t) : dietTags.concat([t]);
      load();
    }));
    document.getElementById('plans').innerHTML = r.plans.length ? r.plans.map(p => `<div class="card">
      <h3><a href="/diet/${esc(p.id)}" data-link>${esc(p.title)}</a></h3>
      <p class="muted">${esc(p.description)}</p>
      ${p.tags.map(t => `<span class="tag">${esc(t)}</span>`).join('')}
    </div>`).join('') : '<p class="muted">No diet plans match your filters.</p>';
  };
  document.getElementById('q').addEventListener('input', load);
  load();
}

async function renderDietDetail(id) {
  let p;
  try { p = await api('GET', '/api/diet/' + encodeURIComponent(id)); } catch (e) { return go('/diet'); }
  view().innerHTML = `<p><a href="/diet" data-link>&larr; Back to diet plans</a></p>
    <div class="card"><h2>${esc(p.title)}</h2>${p.tags.map(t => `<span class="tag">${esc(t)}</span>`).join('')}
    <p>${esc(p.long_description || p.description)}</p></div>
    <div class="grid">
      <div class="card"><h3>Benefits</h3><ul>${p.benefits.map(b => `<li>${esc(b)}</li>`).join('')}</ul></div>
      <div class="card"><h3>Foods to eat</h3><ul>${p.foods_to_eat.map(b => `<li>${esc(b)}</li>`).join('')}</ul></div>
      <div class="card"><h3>Foods to avoid</h3><ul>${p.foods_to_avoid.map(b => `<li>${esc(b)}</li>`).join('')}</ul></div>
    </div>
    ${p.meal_plan.map(d => `<div class="card"><h3>${esc(d.day)}</h3>${d.meals.map(m => `<p><b>${esc(m.kind)}: ${esc(m.name)}</b><br><span class="muted">${esc(m.description)}</span>
      ${m.nutrition ? `<br><span class="muted">${m.nutrition.calories} kcal &middot; ${m.nutrition.carbs}g carbs &middot; ${m.nutrition.protein}g protein &middot; ${m.nutrition.fat}g fat</span>` : ''}</p>`).join('')}</div>`).join('')}
    <div class="card"><h3>Tips</h3><ul>${p.tips.map(t => `<li>${esc(t)}</li>`).join('')}</ul><p class="muted">${esc(p.research)}</p></div>`;
}

// ---------------------------------------------------------------------------
// Exercise
// ---------------------------------------------------------------------------
function renderExercise() {
  view().innerHTML = `<h2>Exercise Plans</h2><br>` + tabs('chat', 'exercise');
  bindTabs('exercise', showExercisePlans);
}

async function showExercisePlans() {
  const body = document.getElementById('tab-body');
  body.innerHTML = `<div class="toolbar"><input type="text" id="q" placeholder="Search exercise plans...">
    <select id="level"><option value="all">All levels</option></select>
    <select id="category"><option value="all">All categories</option></select></div><div class="grid" id="plans"></div>`;
  let filled = false;
  const load = async () => {
    const params = new URLSearchParams({
      q: document.getElementById('q').value,
      level: document.getElementById('level').value,
      category: document.getElementById('category').value,
    });
    const r = await api('GET', '/api/exercise?' + params.toString());
    if (!filled) {
      document.getElementById('level').innerHTML += r.levels.map(l => `<option>${esc(l)}</option>`).join('');
      document.getElementById('category').innerHTML += r.categories.map(c => `<option>${esc(c)}</option>`).join('');
      filled = true;
    }
    document.getElementById('plans').innerHTML = r.plans.length ? r.plans.map(p => `<div class="card">
      <h3><a href="/exercise/${esc(p.id)}" data-link>${esc(p.title)}</a></h3>
      <p class="muted">${esc(p.duration)} &middot; ${esc(p.level)} &middot; ${esc(p.category)}</p>
      <p>${esc(p.description)}</p>
    </div>`).join('') : '<p class="muted">No exercise plans match your filters.</p>';
  };
  document.getElementById('q').addEventListener('input', load);
  document.getElementById('level').addEventListener('change', load);
  document.getElementById('category').addEventListener('change', load);
  load();
}

async function renderExerciseDetail(id) {
  let p;
  try { p = await api('GET', '/api/exercise/' + encodeURIComponent(id)); } catch (e) { return go('/exercise'); }
  view().innerHTML = `<p><a href="/exercise" data-link>&larr; Back to exercise plans</a></p>
    <div class="card"><h2>${esc(p.title)}</h2><p class="muted">${esc(p.level)} &middot; ${esc(p.category)} &middot; ${esc(p.duration)}</p><p>${esc(p.description)}</p></div>
    <div class="grid">
      <div class="card"><h3>Goals</h3><ul>${p.goals.map(g => `<li>${esc(g)}</li>`).join('')}</ul></div>
      <div class="card"><h3>Equipment</h3><ul>${p.equipment.map(g => `<li>${esc(g)}</li>`).join('')}</ul></div>
    </div>
    ${p.schedule.map(d => `<div class="card"><h3>${esc(d.day)}: ${esc(d.focus)}</h3>
      <p class="muted">${esc(d.total_duration)} &middot; ${esc(d.intensity)} intensity &middot; ${esc(d.calories_burn)}</p>
      <p><b>Warm-up:</b> ${esc(d.warmup)}</p>
      ${d.exercises.map(x => `<p><b>${esc(x.name)}</b> <span class="muted">${[x.sets && x.sets + ' sets', x.reps && x.reps + ' reps', x.duration, x.rest_between && 'rest ' + x.rest_between].filter(Boolean).map(esc).join(' &middot; ')}</span><br>${esc(x.description)}</p>`).join('')}
      <p><b>Cool-down:</b> ${esc(d.cooldown)}</p></div>`).join('')}
    <div class="card"><h3>Tips</h3><ul>${p.tips.map(t => `<li>${esc(t)}</li>`).join('')}</ul>
    <h3>Warnings</h3><ul>${p.warnings.map(t => `<li>${esc(t)}</li>`).join('')}</ul></div>`;
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
render();
</script>
</body>
</html>"##;
