use importmap_core::bundle::OutputAsset;
use importmap_core::bundle::OutputBundle;
use importmap_core::bundle::OutputChunk;
use importmap_core::bundle::OutputItem;
use indoc::indoc;

/// Minified entry chunk carrying the import analysis preload helper
pub const APP_JS: &str = r#"const p="modulepreload",m=function(e){return"/"+e},d={},h=function(i,c){let a=Promise.resolve();if(c&&c.length>0){const n=document.querySelector("meta[property=csp-nonce]"),y=n?.nonce||n?.getAttribute("nonce");a=Promise.all(c.map(x=>{if(x=m(x),x in d)return;d[x]=!0;const s=x.endsWith(".css"),z=document.createElement("link");if(z.rel=s?"stylesheet":p,s||(z.as="script"),z.crossOrigin="",z.href=x,y&&z.setAttribute("nonce",y),document.head.appendChild(z),s)return new Promise((o,r)=>{z.addEventListener("load",o),z.addEventListener("error",()=>r(new Error(`Unable to preload CSS for ${x}`)))})}))}return a.then(()=>i())};h(()=>import("./page.js"),["assets/page.js"]);"#;

pub const PAGE_JS: &str = "export default function(){return 42}";

pub const INDEX_HTML: &str = indoc! {r#"
  <!doctype html>
  <html>
    <head>
      <script type="module" crossorigin src="/app.js"></script>
    </head>
    <body></body>
  </html>
"#};

pub fn app_bundle() -> OutputBundle {
  OutputBundle::from_iter([
    OutputItem::from(OutputAsset::new("index.html", INDEX_HTML)),
    OutputItem::from(OutputChunk::new("app.js", APP_JS)),
  ])
}

pub fn chunk_code(bundle: &OutputBundle, file_name: &str) -> String {
  bundle
    .get(file_name)
    .and_then(OutputItem::as_chunk)
    .map(|chunk| chunk.code.clone())
    .unwrap()
}

pub fn entry_html(bundle: &OutputBundle) -> String {
  bundle
    .get("index.html")
    .and_then(OutputItem::as_asset)
    .map(|asset| asset.source.to_text().into_owned())
    .unwrap()
}
