//! The single-page form

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Video / Banner Studio</title>
<style>
  body { font-family: sans-serif; background: #0e1117; color: #fff; max-width: 720px; margin: 2rem auto; }
  label { display: block; margin-top: 1rem; }
  textarea, select, input { width: 100%; }
  button { margin-top: 1.5rem; width: 100%; padding: .5rem; background: #ff4b4b; color: #fff; border: 0; font-weight: 600; }
  .msg { padding: .75rem; margin-top: 1rem; border-radius: .25rem; }
  .info { background: #1c3d5a; } .ok { background: #1e4620; } .err { background: #5a1c1c; }
  #preview img, #preview video { width: 200px; display: block; margin-top: 1rem; }
  code { word-break: break-all; }
</style>
</head>
<body>
<h1>Video / Banner Studio</h1>
__CONFIG_ERROR__
<form id="studio">
  <label>Prompt <textarea name="text" rows="4" placeholder="A woman is holding a case."></textarea></label>
  <label>Image <input type="file" name="image" accept=".jpg,.jpeg,.png,.webp"></label>
  <label>Menu
    <select name="menu"><option>Short video</option><option>Banner</option></select>
  </label>
  <label>Aspect ratio
    <select name="aspect_ratio"><option>vertical</option><option>square</option><option>horizontal</option></select>
  </label>
  <button type="submit">Generate</button>
</form>
<div id="status"></div>
<div id="preview"></div>
<script>
const form = document.getElementById('studio');
const status = document.getElementById('status');
const preview = document.getElementById('preview');
function show(cls, text, locator) {
  status.innerHTML = '';
  const box = document.createElement('div');
  box.className = 'msg ' + cls;
  box.textContent = text;
  if (locator) {
    const code = document.createElement('code');
    code.textContent = locator;
    box.append(document.createElement('br'), code);
  }
  status.append(box);
}
form.addEventListener('submit', async (event) => {
  event.preventDefault();
  preview.innerHTML = '';
  const image = form.elements.image.files[0];
  if (!image) { show('err', 'Please upload an image.'); return; }
  show('info', 'Generation started. It can take a few minutes; please wait until it finishes.');
  form.querySelector('button').disabled = true;
  try {
    const res = await fetch('/api/generate', { method: 'POST', body: new FormData(form) });
    const body = await res.json();
    if (!res.ok) { show('err', body.error.message, body.error.locator); return; }
    show('ok', 'Generation complete!');
    const media = document.createElement(body.mime_type.startsWith('video/') ? 'video' : 'img');
    media.src = body.data_url;
    if (media.tagName === 'VIDEO') media.controls = true;
    const link = document.createElement('a');
    link.href = body.data_url;
    link.download = body.file_name;
    link.type = body.mime_type;
    link.textContent = 'Download';
    preview.append(media, link);
  } catch (err) {
    show('err', 'Request failed: ' + err);
  } finally {
    form.querySelector('button').disabled = false;
  }
});
</script>
</body>
</html>
"#;

/// Render the form, with a banner when generation is not configured
pub fn render(config_error: Option<&str>) -> String {
    let banner = config_error
        .map(|message| format!(r#"<div class="msg err">{}</div>"#, escape(message)))
        .unwrap_or_default();
    TEMPLATE.replace("__CONFIG_ERROR__", &banner)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
