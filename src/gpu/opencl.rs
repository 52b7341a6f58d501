//! OpenCL backend
//!
//! Acquisition walks platform 0 → device 0 of the requested class → context
//! → command queue → program → kernel. Resources are stored on the backend as
//! soon as they exist, so a failure part-way through drops a half-built
//! backend whose teardown releases exactly what was created.

use std::ptr;

use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::{
    Device, CL_DEVICE_TYPE_ACCELERATOR, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_GPU,
};
use opencl3::kernel::{ExecuteKernel, Kernel};
use opencl3::memory::{Buffer, CL_MEM_READ_ONLY, CL_MEM_READ_WRITE};
use opencl3::platform::get_platforms;
use opencl3::program::Program;
use opencl3::types::{cl_device_type, cl_uchar, cl_uint, CL_BLOCKING};

use super::{release_guarded, ComputeBackend, DeviceClass, GpuError, ReleaseReport, KERNEL_NAME, KERNEL_SOURCE};

impl DeviceClass {
    fn cl_type(self) -> cl_device_type {
        match self {
            DeviceClass::Gpu => CL_DEVICE_TYPE_GPU,
            DeviceClass::Cpu => CL_DEVICE_TYPE_CPU,
            DeviceClass::Accelerator => CL_DEVICE_TYPE_ACCELERATOR,
            DeviceClass::All => CL_DEVICE_TYPE_ALL,
        }
    }
}

/// OpenCL context, queue, program and kernel for the counting kernel
pub struct OpenClBackend {
    device_name: String,
    context: Option<Context>,
    queue: Option<CommandQueue>,
    program: Option<Program>,
    kernel: Option<Kernel>,
}

impl std::fmt::Debug for OpenClBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenClBackend")
            .field("device_name", &self.device_name)
            .field("context", &self.context.is_some())
            .field("queue", &self.queue.is_some())
            .field("program", &self.program.is_some())
            .field("kernel", &self.kernel.is_some())
            .finish()
    }
}

impl OpenClBackend {
    /// Acquire platform 0, device 0 of `class`, and build the kernel
    pub fn acquire(class: DeviceClass) -> Result<Self, GpuError> {
        let platforms = get_platforms().map_err(|e| GpuError::NoPlatform(e.to_string()))?;
        let platform = platforms
            .first()
            .ok_or_else(|| GpuError::NoPlatform("no OpenCL platforms installed".to_string()))?;
        let platform_name = platform.name().unwrap_or_default().trim().to_string();

        let no_device = || GpuError::NoDevice {
            class,
            platform: platform_name.clone(),
        };
        let device_ids = platform.get_devices(class.cl_type()).map_err(|_| no_device())?;
        let device = Device::new(*device_ids.first().ok_or_else(no_device)?);
        let device_name = device.name().unwrap_or_default().trim().to_string();

        log::debug!("Using OpenCL device '{}' on platform '{}'", device_name, platform_name);

        let mut backend = Self {
            device_name,
            context: None,
            queue: None,
            program: None,
            kernel: None,
        };

        backend.context =
            Some(Context::from_device(&device).map_err(|e| GpuError::Context(e.to_string()))?);
        let context = backend.context.as_ref().ok_or(GpuError::Released)?;

        // create_default is the OpenCL 1.2 entry point; 2.0 is not universal
        #[allow(deprecated)]
        let queue =
            CommandQueue::create_default(context, 0).map_err(|e| GpuError::Queue(e.to_string()))?;
        backend.queue = Some(queue);

        let context = backend.context.as_ref().ok_or(GpuError::Released)?;
        let program = Program::create_and_build_from_source(context, KERNEL_SOURCE, "")
            .map_err(GpuError::BuildFailure)?;
        backend.program = Some(program);

        let program = backend.program.as_ref().ok_or(GpuError::Released)?;
        let kernel = Kernel::create(program, KERNEL_NAME).map_err(|e| GpuError::KernelMissing {
            name: KERNEL_NAME.to_string(),
            reason: e.to_string(),
        })?;
        backend.kernel = Some(kernel);

        Ok(backend)
    }
}

impl ComputeBackend for OpenClBackend {
    fn device_name(&self) -> &str {
        &self.device_name
    }

    fn count_matches(&mut self, text: &[u8], pattern: &[u8]) -> Result<u64, GpuError> {
        let (Some(context), Some(queue), Some(kernel)) = (&self.context, &self.queue, &self.kernel)
        else {
            return Err(GpuError::Released);
        };

        // Zero-sized buffers are invalid in OpenCL, and no offset can match anyway
        if pattern.is_empty() || pattern.len() > text.len() {
            return Ok(0);
        }

        let text_len = cl_uint::try_from(text.len()).map_err(|_| GpuError::InputTooLarge(text.len()))?;
        let pattern_len =
            cl_uint::try_from(pattern.len()).map_err(|_| GpuError::InputTooLarge(pattern.len()))?;

        let dispatch = |stage: &'static str| {
            move |e: opencl3::error_codes::ClError| GpuError::Dispatch {
                stage,
                reason: e.to_string(),
            }
        };

        // The three buffers live until the end of this call and are released
        // on every exit path, including early returns below.
        let mut text_buf = unsafe {
            Buffer::<cl_uchar>::create(context, CL_MEM_READ_ONLY, text.len(), ptr::null_mut())
                .map_err(dispatch("allocate text buffer"))?
        };
        let mut pattern_buf = unsafe {
            Buffer::<cl_uchar>::create(context, CL_MEM_READ_ONLY, pattern.len(), ptr::null_mut())
                .map_err(dispatch("allocate pattern buffer"))?
        };
        let mut count_buf = unsafe {
            Buffer::<cl_uint>::create(context, CL_MEM_READ_WRITE, 1, ptr::null_mut())
                .map_err(dispatch("allocate count buffer"))?
        };

        unsafe {
            queue
                .enqueue_write_buffer(&mut text_buf, CL_BLOCKING, 0, text, &[])
                .map_err(dispatch("upload text"))?;
            queue
                .enqueue_write_buffer(&mut pattern_buf, CL_BLOCKING, 0, pattern, &[])
                .map_err(dispatch("upload pattern"))?;
            // Device memory is not zeroed on allocation
            queue
                .enqueue_write_buffer(&mut count_buf, CL_BLOCKING, 0, &[0 as cl_uint], &[])
                .map_err(dispatch("zero count buffer"))?;
        }

        let kernel_event = unsafe {
            ExecuteKernel::new(kernel)
                .set_arg(&text_buf)
                .set_arg(&text_len)
                .set_arg(&pattern_buf)
                .set_arg(&pattern_len)
                .set_arg(&count_buf)
                .set_global_work_size(text.len())
                .enqueue_nd_range(queue)
                .map_err(dispatch("enqueue kernel"))?
        };
        kernel_event.wait().map_err(dispatch("wait for kernel"))?;

        let mut count = [0 as cl_uint; 1];
        unsafe {
            queue
                .enqueue_read_buffer(&count_buf, CL_BLOCKING, 0, &mut count, &[])
                .map_err(dispatch("read count"))?;
        }

        Ok(u64::from(count[0]))
    }

    fn release(&mut self) -> ReleaseReport {
        let mut report = ReleaseReport::default();

        release_guarded("kernel", &mut self.kernel, &mut report);
        release_guarded("program", &mut self.program, &mut report);
        release_guarded("command queue", &mut self.queue, &mut report);
        release_guarded("context", &mut self.context, &mut report);

        report
    }
}

impl Drop for OpenClBackend {
    fn drop(&mut self) {
        let report = self.release();
        if !report.is_clean() {
            log::warn!("OpenCL teardown left resources behind: {:?}", report.failed);
        }
    }
}
