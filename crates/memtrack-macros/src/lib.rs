use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{parse_macro_input, ItemFn, LitStr};

#[derive(Clone, Copy)]
enum Format {
    Text,
    Table,
    Json,
    JsonPretty,
}

impl Format {
    fn to_tokens(self) -> proc_macro2::TokenStream {
        match self {
            Format::Text => quote!(memtrack::Format::Text),
            Format::Table => quote!(memtrack::Format::Table),
            Format::Json => quote!(memtrack::Format::Json),
            Format::JsonPretty => quote!(memtrack::Format::JsonPretty),
        }
    }
}

/// Prints the memtrack report when the annotated function returns.
///
/// The macro wraps the function body in a
/// [`ReportGuard`](../memtrack/struct.ReportGuard.html) labelled with the
/// function's path. When the guard drops, the summary and the list of
/// allocations still live are printed. If the program later exits through an
/// `atexit` hook registered with `register_exit_report`, that hook stays silent.
///
/// # Parameters
///
/// * `format` - Output format as a string: `"text"` (default), `"table"`, `"json"`, or `"json-pretty"`
///
/// # Examples
///
/// ```rust,no_run
/// #[memtrack::main]
/// fn main() {
///     let block = memtrack::malloc(16);
///     unsafe { memtrack::free(block) };
/// }
/// ```
///
/// JSON output format:
///
/// ```rust,no_run
/// #[memtrack::main(format = "json-pretty")]
/// fn main() {
///     // Your code here
/// }
/// ```
///
/// Async entry points work too; put the runtime attribute first:
///
/// ```rust,ignore
/// #[tokio::main]
/// #[memtrack::main]
/// async fn main() {}
/// ```
///
/// # Limitations
///
/// Only one report guard can be alive at a time. Creating a second guard (either via this
/// macro or via [`GuardBuilder`](../memtrack/struct.GuardBuilder.html)) panics.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    if cfg!(feature = "memtrack-off") {
        return item;
    }

    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    let mut format = Format::Text;

    if !attr.is_empty() {
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("format") {
                meta.input.parse::<syn::Token![=]>()?;
                let lit: LitStr = meta.input.parse()?;
                format = match lit.value().as_str() {
                    "text" => Format::Text,
                    "table" => Format::Table,
                    "json" => Format::Json,
                    "json-pretty" => Format::JsonPretty,
                    other => return Err(meta.error(format!(
                        "Unknown format {:?}. Expected one of: \"text\", \"table\", \"json\", \"json-pretty\"",
                        other
                    ))),
                };
                return Ok(());
            }

            Err(meta.error("Unknown parameter. Supported: format=\"..\""))
        });

        if let Err(e) = parser.parse2(proc_macro2::TokenStream::from(attr)) {
            return e.to_compile_error().into();
        }
    }

    let format_token = format.to_tokens();
    let fn_name = &sig.ident;

    let body = quote! {
        let _memtrack = {
            let caller_name: &'static str =
                concat!(module_path!(), "::", stringify!(#fn_name));

            memtrack::GuardBuilder::new(caller_name)
                .format(#format_token)
                .build()
        };
        #block
    };

    let wrapped_body = if sig.asyncness.is_some() {
        quote! { async { #body }.await }
    } else {
        body
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #wrapped_body
        }
    };

    output.into()
}
