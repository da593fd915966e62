//! COM automation transport.
//!
//! Illustrator on Windows is driven through its late-bound `IDispatch`
//! interface: property and method names are resolved with `GetIDsOfNames`
//! and invoked with `Invoke`. [`ComObject`] wraps that handshake; the
//! transport itself is a thin layer of named properties and calls on top.
//!
//! Candidate rejection during connection mirrors the dispatch retry loop:
//! an endpoint whose `Application` object does not know `ActiveDocument`
//! exposes the wrong object model and is reported as a failure so the
//! locator can exclude it; an endpoint that knows the name but has no
//! document open is accepted.

use std::path::{Path, PathBuf};

use windows::core::{BSTR, GUID, HSTRING, PCWSTR, VARIANT};
use windows::Win32::Foundation::{DISP_E_EXCEPTION, DISP_E_UNKNOWNNAME, RPC_E_CHANGED_MODE};
use windows::Win32::System::Com::{
    CLSIDFromProgID, CoCreateInstance, CoInitializeEx, CLSCTX_LOCAL_SERVER,
    COINIT_APARTMENTTHREADED, IDispatch, DISPATCH_FLAGS, DISPATCH_METHOD, DISPATCH_PROPERTYGET,
    DISPATCH_PROPERTYPUT, DISPPARAMS, EXCEPINFO,
};

use crate::dispatch::DEFAULT_PROG_ID;
use crate::export::{ExportSpec, OptionValue};
use crate::transport::IllustratorTransport;
use crate::types::{BridgeError, ConnectionInfo};

const LOCALE_USER_DEFAULT: u32 = 0x0400;
const DISPID_PROPERTYPUT: i32 = -3;

/// Late-bound COM automation object.
#[derive(Clone)]
struct ComObject {
    inner: IDispatch,
}

impl ComObject {
    /// Instantiate a registered automation class by ProgID.
    fn create(prog_id: &str) -> Result<Self, BridgeError> {
        let wide = HSTRING::from(prog_id);
        let inner: IDispatch = unsafe {
            let clsid = CLSIDFromProgID(PCWSTR(wide.as_ptr()))
                .map_err(|e| BridgeError::TransportFailure(format!("{}: {}", prog_id, e)))?;
            CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER)
                .map_err(|e| BridgeError::TransportFailure(format!("{}: {}", prog_id, e)))?
        };
        Ok(ComObject { inner })
    }

    /// Resolve a member name to its dispatch id.
    fn dispid(&self, name: &str) -> windows::core::Result<i32> {
        let wide = HSTRING::from(name);
        let names = [PCWSTR(wide.as_ptr())];
        let mut dispid = 0i32;
        unsafe {
            self.inner.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                LOCALE_USER_DEFAULT,
                &mut dispid,
            )?;
        }
        Ok(dispid)
    }

    /// Whether this object's type knows a member of the given name.
    fn knows(&self, name: &str) -> Result<bool, BridgeError> {
        match self.dispid(name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == DISP_E_UNKNOWNNAME => Ok(false),
            Err(e) => Err(BridgeError::TransportFailure(e.to_string())),
        }
    }

    fn invoke(
        &self,
        name: &str,
        flags: DISPATCH_FLAGS,
        mut args: Vec<VARIANT>,
    ) -> Result<VARIANT, BridgeError> {
        let dispid = self
            .dispid(name)
            .map_err(|e| BridgeError::TransportFailure(format!("{}: {}", name, e)))?;

        // Invoke expects arguments last-to-first
        args.reverse();

        let mut named_put = DISPID_PROPERTYPUT;
        let is_put = flags == DISPATCH_PROPERTYPUT;
        let params = DISPPARAMS {
            rgvarg: if args.is_empty() {
                std::ptr::null_mut()
            } else {
                args.as_mut_ptr()
            },
            rgdispidNamedArgs: if is_put {
                &mut named_put
            } else {
                std::ptr::null_mut()
            },
            cArgs: args.len() as u32,
            cNamedArgs: if is_put { 1 } else { 0 },
        };

        let mut result = VARIANT::new();
        let mut exception = EXCEPINFO::default();
        let invoked = unsafe {
            self.inner.Invoke(
                dispid,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                Some(&mut result as *mut _),
                Some(&mut exception as *mut _),
                None,
            )
        };

        match invoked {
            Ok(()) => Ok(result),
            Err(e) if e.code() == DISP_E_EXCEPTION => {
                // Surface the application's own description when it raised
                let description = exception.bstrDescription.to_string();
                if description.is_empty() {
                    Err(BridgeError::TransportFailure(format!("{}: {}", name, e)))
                } else {
                    Err(BridgeError::TransportFailure(description))
                }
            }
            Err(e) => Err(BridgeError::TransportFailure(format!("{}: {}", name, e))),
        }
    }

    fn get(&self, name: &str) -> Result<VARIANT, BridgeError> {
        self.invoke(name, DISPATCH_PROPERTYGET, Vec::new())
    }

    fn get_string(&self, name: &str) -> Result<String, BridgeError> {
        let value = self.get(name)?;
        BSTR::try_from(&value)
            .map(|b| b.to_string())
            .map_err(|e| BridgeError::TransportFailure(format!("{}: {}", name, e)))
    }

    fn get_object(&self, name: &str) -> Result<ComObject, BridgeError> {
        let value = self.get(name)?;
        IDispatch::try_from(&value)
            .map(|inner| ComObject { inner })
            .map_err(|e| BridgeError::TransportFailure(format!("{}: {}", name, e)))
    }

    fn put(&self, name: &str, value: VARIANT) -> Result<(), BridgeError> {
        self.invoke(name, DISPATCH_PROPERTYPUT, vec![value])?;
        Ok(())
    }

    fn call(&self, name: &str, args: Vec<VARIANT>) -> Result<VARIANT, BridgeError> {
        self.invoke(name, DISPATCH_METHOD, args)
    }
}

/// Transport speaking COM automation to a bound Illustrator endpoint.
pub struct ComTransport {
    application: ComObject,
    dispatch_name: String,
    dispatch_suffix: Option<String>,
}

impl ComTransport {
    /// Bind to the endpoint named by `dispatch_name` and verify it exposes
    /// Illustrator's document object model.
    pub fn connect(dispatch_name: &str) -> Result<Self, BridgeError> {
        init_com()?;

        let root = ComObject::create(dispatch_name)?;
        let application = root.get_object("Application")?;

        // Wrong object model behind this ProgID: reject the candidate.
        // A bound endpoint with no document open still knows the name.
        if !application.knows("ActiveDocument")? {
            return Err(BridgeError::TransportFailure(format!(
                "{} does not expose ActiveDocument",
                dispatch_name
            )));
        }

        let dispatch_suffix = dispatch_name
            .strip_prefix(DEFAULT_PROG_ID)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(ComTransport {
            application,
            dispatch_name: dispatch_name.to_string(),
            dispatch_suffix,
        })
    }

    fn active_document(&self) -> Result<Option<ComObject>, BridgeError> {
        match self.application.get_object("ActiveDocument") {
            Ok(doc) => Ok(Some(doc)),
            Err(err) => {
                log::debug!("no active document: {}", err);
                Ok(None)
            }
        }
    }

    fn require_document(&self) -> Result<ComObject, BridgeError> {
        self.active_document()?.ok_or_else(|| {
            BridgeError::NotConnected("no document is open in Illustrator".to_string())
        })
    }
}

impl IllustratorTransport for ComTransport {
    fn document_path(&self) -> Result<Option<PathBuf>, BridgeError> {
        let Some(doc) = self.active_document()? else {
            return Ok(None);
        };
        // FullName is only set once the document has been saved
        match doc.get_string("FullName") {
            Ok(full_name) if !full_name.is_empty() => Ok(Some(PathBuf::from(full_name))),
            Ok(_) => Ok(None),
            Err(err) => {
                log::debug!("FullName unavailable: {}", err);
                Ok(None)
            }
        }
    }

    fn active_document_name(&self) -> Result<Option<String>, BridgeError> {
        let Some(doc) = self.active_document()? else {
            return Ok(None);
        };
        Ok(Some(doc.get_string("Name")?))
    }

    fn save_as(&self, path: &Path) -> Result<(), BridgeError> {
        let doc = self.require_document()?;
        let native = path.to_string_lossy().replace('/', "\\");
        doc.call("SaveAs", vec![VARIANT::from(BSTR::from(native))])?;
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<(), BridgeError> {
        let native = path.to_string_lossy().replace('/', "\\");
        self.application
            .call("Open", vec![VARIANT::from(BSTR::from(native))])?;
        Ok(())
    }

    fn export(&self, path: &Path, spec: &ExportSpec) -> Result<(), BridgeError> {
        let doc = self.require_document()?;

        let options = ComObject::create(spec.format.options_prog_id())?;
        for (name, value) in spec.com_properties() {
            let variant = match value {
                OptionValue::Bool(b) => VARIANT::from(*b),
                OptionValue::Int(i) => VARIANT::from(*i),
            };
            options.put(name, variant)?;
        }

        let native = path.to_string_lossy().replace('/', "\\");
        doc.call(
            "Export",
            vec![
                VARIANT::from(BSTR::from(native)),
                VARIANT::from(spec.format.type_code()),
                VARIANT::from(options.inner),
            ],
        )?;
        Ok(())
    }

    fn version(&self) -> Result<String, BridgeError> {
        self.application.get_string("Version")
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::new(&self.dispatch_name, self.dispatch_suffix.clone(), "com")
    }
}

/// Initialize COM for the calling thread. An apartment already initialized
/// in a different mode is left alone.
fn init_com() -> Result<(), BridgeError> {
    let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
    if hr.is_err() && hr != RPC_E_CHANGED_MODE {
        return Err(BridgeError::TransportFailure(format!(
            "CoInitializeEx failed: {:?}",
            hr
        )));
    }
    Ok(())
}
