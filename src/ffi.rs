//! FFI bindings for VitalIA
//!
//! This module provides C-compatible functions for embedding the assistant in
//! other runtimes. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `vitalia_free_string`.
//!
//! The assistant handle may be shared between threads: every call only takes
//! a shared reference to it.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::assistant::VitalsAssistant;
use crate::config::EngineConfig;
use crate::store::ReadingStore;
use std::sync::Arc;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => {
            set_last_error("Result contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

fn into_handle(assistant: VitalsAssistant) -> *mut VitaliaAssistantHandle {
    Box::into_raw(Box::new(VitaliaAssistantHandle { assistant }))
}

// ============================================================================
// Assistant lifecycle
// ============================================================================

/// Opaque handle to a VitalsAssistant
pub struct VitaliaAssistantHandle {
    assistant: VitalsAssistant,
}

/// Create an assistant whose store keeps `store_capacity` readings.
///
/// # Safety
/// - Returns a pointer to a newly allocated assistant.
/// - Must be freed with `vitalia_assistant_free`.
/// - A capacity of zero or less selects the default of 60.
#[no_mangle]
pub unsafe extern "C" fn vitalia_assistant_new(store_capacity: i32) -> *mut VitaliaAssistantHandle {
    clear_last_error();

    let mut config = EngineConfig::default();
    if store_capacity > 0 {
        config.store_capacity = store_capacity as usize;
    }

    match VitalsAssistant::with_config(config) {
        Ok(assistant) => into_handle(assistant),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Create an assistant from an engine configuration JSON.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Must be freed with `vitalia_assistant_free`.
/// - Returns NULL on error; call `vitalia_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitalia_assistant_with_config(
    config_json: *const c_char,
) -> *mut VitaliaAssistantHandle {
    clear_last_error();

    let Some(json) = cstr_to_string(config_json) else {
        set_last_error("Invalid config string pointer");
        return ptr::null_mut();
    };

    match EngineConfig::from_json(&json).and_then(VitalsAssistant::with_config) {
        Ok(assistant) => into_handle(assistant),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Restore an assistant from a saved store, keeping the saved capacity and
/// the default configuration otherwise.
///
/// # Safety
/// - `store_json` must be a valid null-terminated C string produced by
///   `vitalia_save_store`.
/// - Must be freed with `vitalia_assistant_free`.
/// - Returns NULL on error; call `vitalia_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitalia_assistant_from_saved_store(
    store_json: *const c_char,
) -> *mut VitaliaAssistantHandle {
    clear_last_error();

    let Some(json) = cstr_to_string(store_json) else {
        set_last_error("Invalid store string pointer");
        return ptr::null_mut();
    };

    let restored = ReadingStore::from_json(&json).and_then(|store| {
        let config = EngineConfig {
            store_capacity: store.capacity(),
            ..EngineConfig::default()
        };
        VitalsAssistant::new(Arc::new(store), config)
    });

    match restored {
        Ok(assistant) => into_handle(assistant),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an assistant.
///
/// # Safety
/// - `assistant` must be a valid pointer returned by a `vitalia_assistant_*`
///   constructor, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitalia_assistant_free(assistant: *mut VitaliaAssistantHandle) {
    if !assistant.is_null() {
        drop(Box::from_raw(assistant));
    }
}

// ============================================================================
// Assistant operations
// ============================================================================

/// Ingest a device report and return the ingest outcome as JSON.
///
/// # Safety
/// - `assistant` must be a valid pointer returned by a constructor.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `vitalia_free_string`.
/// - Returns NULL on error; call `vitalia_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitalia_ingest(
    assistant: *const VitaliaAssistantHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if assistant.is_null() {
        set_last_error("Null assistant pointer");
        return ptr::null_mut();
    }
    let handle = &*assistant;

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    let outcome = handle
        .assistant
        .ingest_json(&json_str)
        .and_then(|outcome| serde_json::to_string(&outcome).map_err(Into::into));

    match outcome {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Answer a chat body `{"message": ...}` with `{"reply": ...}`.
///
/// # Safety
/// - `assistant` must be a valid pointer returned by a constructor.
/// - `body` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `vitalia_free_string`.
/// - Returns NULL on error; call `vitalia_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitalia_chat(
    assistant: *const VitaliaAssistantHandle,
    body: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if assistant.is_null() {
        set_last_error("Null assistant pointer");
        return ptr::null_mut();
    }
    let handle = &*assistant;

    let Some(body_str) = cstr_to_string(body) else {
        set_last_error("Invalid chat body pointer");
        return ptr::null_mut();
    };

    match handle.assistant.chat_json(&body_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Answer a plain-text message with plain-text reply.
///
/// # Safety
/// - `assistant` must be a valid pointer returned by a constructor.
/// - `message` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `vitalia_free_string`.
#[no_mangle]
pub unsafe extern "C" fn vitalia_reply(
    assistant: *const VitaliaAssistantHandle,
    message: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if assistant.is_null() {
        set_last_error("Null assistant pointer");
        return ptr::null_mut();
    }
    let handle = &*assistant;

    let Some(message_str) = cstr_to_string(message) else {
        set_last_error("Invalid message string pointer");
        return ptr::null_mut();
    };

    string_to_cstr(&handle.assistant.reply(&message_str))
}

/// Dashboard snapshot as JSON.
///
/// # Safety
/// - `assistant` must be a valid pointer returned by a constructor.
/// - Returns a newly allocated string that must be freed with `vitalia_free_string`.
/// - Returns NULL on error; call `vitalia_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitalia_snapshot(assistant: *const VitaliaAssistantHandle) -> *mut c_char {
    clear_last_error();

    if assistant.is_null() {
        set_last_error("Null assistant pointer");
        return ptr::null_mut();
    }
    let handle = &*assistant;

    match handle.assistant.snapshot_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save the reading store to JSON.
///
/// # Safety
/// - `assistant` must be a valid pointer returned by a constructor.
/// - Returns a newly allocated string that must be freed with `vitalia_free_string`.
/// - Returns NULL on error; call `vitalia_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitalia_save_store(
    assistant: *const VitaliaAssistantHandle,
) -> *mut c_char {
    clear_last_error();

    if assistant.is_null() {
        set_last_error("Null assistant pointer");
        return ptr::null_mut();
    }
    let handle = &*assistant;

    match handle.assistant.save_store() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by VitalIA functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a VitalIA function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitalia_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next VitalIA call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn vitalia_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the VitalIA library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn vitalia_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
