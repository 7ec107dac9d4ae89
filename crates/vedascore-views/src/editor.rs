//! Code editor: the tool buttons and file save/load.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vedascore_core::markup::html_escape;
use vedascore_core::model::SaveFile;
use vedascore_core::tools::{EditorTool, ToolRequest};
use vedascore_core::{ApiError, VedaApi};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::loader::{LoadSpec, ResourceLoader};
use crate::surface::Surface;

pub const CODE: &str = "code-editor";
pub const FILENAME: &str = "filename-input";
pub const OUTPUT: &str = "output-container";

pub const WELCOME: &str =
    "Welcome to VedaScore! Use the buttons above to interact with your code.";
pub const NEW_FILE_TEMPLATE: &str = "# New file\n# Start coding here...";
pub const NEW_FILE_NAME: &str = "new_file.py";

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditorState {
    code: String,
    filename: String,
    output: String,
}

pub struct EditorController {
    api: Arc<dyn VedaApi>,
    surface: Arc<dyn Surface>,
    loader: ResourceLoader,
    state: Mutex<EditorState>,
}

impl EditorController {
    pub fn new(api: Arc<dyn VedaApi>, surface: Arc<dyn Surface>) -> Self {
        Self {
            api,
            loader: ResourceLoader::new(surface.clone()),
            surface,
            state: Mutex::new(EditorState {
                code: String::new(),
                filename: NEW_FILE_NAME.to_string(),
                output: WELCOME.to_string(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn code(&self) -> String {
        self.state().code.clone()
    }

    pub fn filename(&self) -> String {
        self.state().filename.clone()
    }

    pub fn output(&self) -> String {
        self.state().output.clone()
    }

    /// Draw every editor region from state.
    pub fn render(&self) {
        let state = self.state().clone();
        self.surface.set_html(CODE, render_code(&state.code));
        self.surface.set_html(FILENAME, html_escape(&state.filename));
        self.surface.set_html(OUTPUT, render_output(&state.output));
    }

    /// The user typed into the editor.
    pub fn set_code(&self, code: &str) {
        self.state().code = code.to_string();
        self.surface.set_html(CODE, render_code(code));
    }

    pub fn set_filename(&self, filename: &str) {
        self.state().filename = filename.to_string();
        self.surface.set_html(FILENAME, html_escape(filename));
    }

    fn show(&self, text: String) {
        self.surface.set_html(OUTPUT, render_output(&text));
        self.state().output = text;
    }

    /// Send the current code to `tool` and show its answer.
    ///
    /// Convert needs a target language; without one nothing is sent.
    pub async fn run_tool(&self, tool: EditorTool, target_language: Option<&str>) {
        let target_language = target_language.map(str::trim).filter(|l| !l.is_empty());
        let mut request = ToolRequest::new(self.code());
        if tool.requires_target_language() {
            let Some(language) = target_language else {
                tracing::debug!(%tool, "no target language given, skipping");
                return;
            };
            request = request.with_target_language(language);
        }

        self.show("Processing...".to_string());
        let call = async {
            let body = self.api.run_tool(tool, &request).await?;
            tool.render_output(&body)
        };
        if let Ok(text) = self.fetch_output(call).await {
            self.show(text);
        }
    }

    /// Await an editor request; a failure becomes the output text.
    async fn fetch_output<T>(
        &self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        let spec = LoadSpec::new("Error");
        self.loader
            .fetch(&[], &spec, request, |e| self.show(format!("Error: {e}")))
            .await
    }

    pub fn new_file(&self) {
        {
            let mut state = self.state();
            state.code = NEW_FILE_TEMPLATE.to_string();
            state.filename = NEW_FILE_NAME.to_string();
        }
        self.surface.set_html(CODE, render_code(NEW_FILE_TEMPLATE));
        self.surface.set_html(FILENAME, NEW_FILE_NAME.to_string());
        self.show("New file created. Start coding!".to_string());
    }

    pub async fn save_file(&self) {
        let file = {
            let state = self.state();
            SaveFile {
                filename: state.filename.clone(),
                content: state.code.clone(),
            }
        };
        self.show("Processing...".to_string());
        if let Ok(response) = self.fetch_output(self.api.save_file(&file)).await {
            self.show(response.message);
        }
    }

    pub async fn load_file(&self, file_id: &str) {
        let Ok(file) = self.fetch_output(self.api.load_file(file_id)).await else {
            return;
        };
        {
            let mut state = self.state();
            state.filename = file.filename.clone();
            state.code = file.content.clone();
        }
        self.surface.set_html(CODE, render_code(&file.content));
        self.surface.set_html(FILENAME, html_escape(&file.filename));
        self.show(format!("File \"{}\" loaded successfully!", file.filename));
    }

    /// Register `editor.*` actions. Each tool is `editor.<tool name>`.
    pub fn register(self: &Arc<Self>, dispatcher: &mut Dispatcher) {
        for tool in EditorTool::ALL {
            let this = self.clone();
            dispatcher.register(&format!("editor.{tool}"), move |params| {
                let this = this.clone();
                async move {
                    if tool.requires_target_language() {
                        params.str("target_language")?;
                    }
                    if let Some(code) = params.opt("code") {
                        this.set_code(code);
                    }
                    this.run_tool(tool, params.opt("target_language")).await;
                    Ok(())
                }
            });
        }

        let this = self.clone();
        dispatcher.register("editor.new_file", move |_| {
            let this = this.clone();
            async move {
                this.new_file();
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("editor.save_file", move |params| {
            let this = this.clone();
            async move {
                if let Some(name) = params.opt("filename") {
                    this.set_filename(name);
                }
                if let Some(code) = params.opt("code") {
                    this.set_code(code);
                }
                this.save_file().await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("editor.load_file", move |params| {
            let this = this.clone();
            async move {
                let id = params.str("file_id")?;
                if id.trim().is_empty() {
                    return Err(DispatchError::InvalidParam {
                        action: "editor.load_file".to_string(),
                        param: "file_id".to_string(),
                        value: id.to_string(),
                    });
                }
                this.load_file(id).await;
                Ok(())
            }
        });
    }
}

fn render_code(code: &str) -> String {
    format!("<pre><code>{}</code></pre>", html_escape(code))
}

fn render_output(text: &str) -> String {
    format!("<pre>{}</pre>", html_escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    use vedascore_client::MockApi;

    use crate::dispatch::Params;
    use crate::surface::MemorySurface;

    fn editor(api: MockApi) -> (Arc<MockApi>, Arc<MemorySurface>, Arc<EditorController>) {
        let api = Arc::new(api);
        let surface = Arc::new(MemorySurface::new());
        let editor = Arc::new(EditorController::new(api.clone(), surface.clone()));
        (api, surface, editor)
    }

    #[tokio::test]
    async fn starts_with_welcome() {
        let (_api, surface, editor) = editor(MockApi::new());
        editor.render();
        assert_eq!(editor.output(), WELCOME);
        assert_eq!(surface.html(FILENAME), NEW_FILE_NAME);
    }

    #[tokio::test]
    async fn tool_output_replaces_processing() {
        let (_api, surface, editor) = editor(MockApi::new());
        editor.set_code("a = 1\nb = 2\nprint(a + b)");
        editor.run_tool(EditorTool::Optimize, None).await;
        assert_eq!(editor.output(), "optimize: 3 line(s) processed");
        assert_eq!(
            surface.html(OUTPUT),
            "<pre>optimize: 3 line(s) processed</pre>"
        );
    }

    #[tokio::test]
    async fn plagiarism_scan_is_formatted() {
        let (_api, _surface, editor) = editor(MockApi::new());
        editor.set_code("x = 1");
        editor.run_tool(EditorTool::CheckPlagiarism, None).await;
        assert_eq!(
            editor.output(),
            "Plagiarism Analysis:\nSimilarity Score: 5%\nOriginality Score: 95%\n\nNo matching sources found."
        );
    }

    #[tokio::test]
    async fn convert_needs_target_language() {
        let (api, _surface, editor) = editor(MockApi::new());
        editor.set_code("x = 1");
        editor.run_tool(EditorTool::Convert, Some("  ")).await;
        assert_eq!(api.call_count("run_tool"), 0);
        assert_eq!(editor.output(), WELCOME);

        editor.run_tool(EditorTool::Convert, Some("Java")).await;
        assert_eq!(editor.output(), "// Java\nx = 1");
    }

    #[tokio::test]
    async fn tool_error_is_shown() {
        let api = MockApi::new();
        api.fail("run_tool");
        let (_api, _surface, editor) = editor(api);
        editor.run_tool(EditorTool::Run, None).await;
        assert_eq!(editor.output(), "Error: run_tool failed (HTTP 500)");
    }

    #[tokio::test]
    async fn new_save_and_load_file() {
        let (api, surface, editor) = editor(MockApi::demo());
        editor.new_file();
        assert_eq!(editor.code(), NEW_FILE_TEMPLATE);
        assert_eq!(editor.filename(), "new_file.py");
        assert_eq!(editor.output(), "New file created. Start coding!");

        editor.set_code("print(1)");
        editor.save_file().await;
        assert_eq!(editor.output(), "File new_file.py saved successfully");
        assert_eq!(
            api.load_file("new_file.py").await.unwrap().content,
            "print(1)"
        );

        editor.load_file("hello.py").await;
        assert_eq!(editor.filename(), "hello.py");
        assert_eq!(editor.code(), "print('hello')\n");
        assert_eq!(editor.output(), "File \"hello.py\" loaded successfully!");
        assert!(surface.html(CODE).contains("print(&#x27;hello&#x27;)"));

        editor.load_file("missing.py").await;
        assert_eq!(editor.output(), "Error: not found: File not found");
        assert_eq!(editor.filename(), "hello.py");
    }

    #[tokio::test]
    async fn actions_cover_every_tool() {
        let (api, _surface, editor) = editor(MockApi::new());
        let mut dispatcher = Dispatcher::new();
        editor.register(&mut dispatcher);
        for tool in EditorTool::ALL {
            assert!(dispatcher.actions().contains(&format!("editor.{tool}").as_str()));
        }

        dispatcher
            .dispatch("editor.explain", Params::new([("code", "x = 1")]))
            .await
            .unwrap();
        assert_eq!(editor.output(), "explain: 1 line(s) processed");

        let err = dispatcher
            .dispatch("editor.convert", Params::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "editor.convert: missing parameter 'target_language'"
        );
        assert_eq!(api.call_count("run_tool"), 1);
    }
}
