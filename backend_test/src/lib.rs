use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject dependencies.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// `crate::store::Stores` and [`mongodb::Database`].
///
/// The `Client` and `Stores` are backed by the same fresh in-memory stores, so
/// a test can seed data through the stores and observe it over HTTP (or vice
/// versa).
///
/// A `Database` is a freshly prepared, randomly named database on the server
/// named by `db_uri` in the Rocket config. It is dropped once the test ends,
/// regardless of how it terminates. If no server is reachable, the test is
/// skipped with a message on stderr.
#[proc_macro_attribute]
pub fn backend_test(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let (test_args, needs_db) = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup(
                needs_db: bool,
            ) -> (
                rocket::local::asynchronous::Client,
                crate::store::Stores,
                Option<mongodb::Database>,
            ) {
                log4rs_test_utils::test_logging::init_logging_once_for(
                    ["survey_backend"],
                    None,
                    None,
                );

                let stores = crate::store::Stores::in_memory();
                let rocket_client = rocket::local::asynchronous::Client::tracked(
                    crate::rocket_for_stores(stores.clone()),
                )
                .await
                .unwrap();

                let db = if needs_db { connect().await } else { None };

                (rocket_client, stores, db)
            }

            /// Connect to a fresh test database, if a server is reachable.
            async fn connect() -> Option<mongodb::Database> {
                let db_uri = rocket::Config::figment()
                    .extract_inner::<String>("db_uri")
                    .ok()?;
                let mut options = mongodb::options::ClientOptions::parse(&db_uri).await.ok()?;
                options.server_selection_timeout = Some(std::time::Duration::from_secs(2));
                let db = mongodb::Client::with_options(options)
                    .ok()?
                    .database(&crate::config::get_database_name());

                db.run_command(mongodb::bson::doc! { "ping": 1 }, None)
                    .await
                    .ok()?;
                crate::config::prepare_database(&db).await.unwrap();
                Some(db)
            }

            /// The test itself.
            #item_fn

            /// Test cleanup.
            async fn cleanup(db: mongodb::Database) {
                db.drop(None).await.unwrap();
            }

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup-cleanup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let (rocket_client, stores, db) = outer_runtime.block_on(setup(#needs_db));
            if #needs_db && db.is_none() {
                eprintln!("skipping {}: no MongoDB server reachable", stringify!(#name));
                return;
            }

            // Run the test, catching any panics.
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                // Not every test takes every dependency.
                let _ = (&rocket_client, &stores, &db);
                inner_runtime.block_on(#new_name(#(#test_args),*));
            }));

            // Run the cleanup.
            if let Some(db) = db {
                outer_runtime.block_on(cleanup(db));
            }

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::resume_unwind(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
///
/// Also reports whether the test needs a database.
fn check_sig(sig: Signature) -> Result<(Vec<TokenStream2>, bool), syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_stores = false;
    let mut has_db = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    // Valid as the last path segment for any type is itself
                    let type_ident = &type_path.path.segments.last().unwrap().ident;
                    let (seen, arg, what) = if type_ident == "Client" {
                        (
                            &mut has_client,
                            quote! { rocket_client },
                            "`rocket::local::asynchronous::Client`",
                        )
                    } else if type_ident == "Stores" {
                        (&mut has_stores, quote! { stores }, "`Stores`")
                    } else if type_ident == "Database" {
                        // Valid because the test is skipped when no database is available.
                        (
                            &mut has_db,
                            quote! { db.clone().unwrap() },
                            "`mongodb::Database`",
                        )
                    } else {
                        return Err(unexpected(input));
                    };

                    if *seen {
                        return Err(syn::Error::new(
                            input.span(),
                            format!("Test cannot accept more than one {what}"),
                        ));
                    }
                    *seen = true;
                    args.push(arg);
                    continue;
                }
            }
        }

        return Err(unexpected(input));
    }

    Ok((args, has_db))
}

fn unexpected(input: &FnArg) -> syn::Error {
    syn::Error::new(
        input.span(),
        "Expected one of `client_ident: Client`, `stores_ident: Stores` or `db_ident: Database`",
    )
}
